//! Context Resolver
//!
//! Maps the reranker's ordered text list back to the structured FAQ
//! records they came from. The canonicalized document text is the join
//! key; order is the reranker's order. A text the index does not know
//! (which the coarse-search invariant rules out, but transport bugs do
//! happen) is dropped with a warning rather than failing the turn.

use campusfaq_common::records::FaqRecord;
use campusfaq_index::VectorIndex;
use tracing::warn;

/// Resolve reranked document texts to their source records, preserving
/// the reranker's order.
pub fn resolve_contexts(reranked_texts: &[String], index: &VectorIndex) -> Vec<FaqRecord> {
    let mut contexts = Vec::with_capacity(reranked_texts.len());

    for text in reranked_texts {
        match index.find_by_text(text) {
            Some(entry) => contexts.push(entry.record.clone()),
            None => {
                let prefix: String = text.chars().take(40).collect();
                warn!(
                    text_prefix = %prefix,
                    "Reranked text not found in index, dropping"
                );
            }
        }
    }

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusfaq_index::IndexArtifact;

    fn index() -> VectorIndex {
        let records = vec![
            FaqRecord::new("Сколько стоит обучение?", "1.2 млн тенге."),
            FaqRecord::new("Есть ли общежитие?", "Да, есть."),
            FaqRecord::new("Какие есть гранты?", "Государственные."),
        ];
        let artifact = IndexArtifact {
            document_texts: records.iter().map(|r| r.document_text()).collect(),
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            records,
        };
        VectorIndex::from_artifact(artifact).unwrap()
    }

    #[test]
    fn test_preserves_reranker_order() {
        let index = index();
        let reranked = vec![
            index.get(2).unwrap().document_text.clone(),
            index.get(0).unwrap().document_text.clone(),
        ];

        let contexts = resolve_contexts(&reranked, &index);

        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].question, "Какие есть гранты?");
        assert_eq!(contexts[1].question, "Сколько стоит обучение?");
    }

    #[test]
    fn test_roundtrip_through_canonicalization() {
        // Resolving then re-deriving the text from each record reproduces
        // the reranker's list.
        let index = index();
        let reranked: Vec<String> = vec![
            index.get(1).unwrap().document_text.clone(),
            index.get(2).unwrap().document_text.clone(),
        ];

        let contexts = resolve_contexts(&reranked, &index);
        let rederived: Vec<String> = contexts.iter().map(|r| r.document_text()).collect();
        assert_eq!(rederived, reranked);
    }

    #[test]
    fn test_unknown_text_silently_dropped() {
        let index = index();
        let reranked = vec![
            "Вопрос: неизвестно Ответ: неизвестно".to_string(),
            index.get(0).unwrap().document_text.clone(),
        ];

        let contexts = resolve_contexts(&reranked, &index);

        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].question, "Сколько стоит обучение?");
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let index = index();
        let reranked = vec![index.get(0).unwrap().document_text.clone()];
        let contexts = resolve_contexts(&reranked, &index);
        assert!(contexts.len() <= reranked.len());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let contexts = resolve_contexts(&[], &index());
        assert!(contexts.is_empty());
    }
}
