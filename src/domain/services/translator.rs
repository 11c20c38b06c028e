use super::SubmissionFault;
use crate::domain::model::{CodeMap, Submission};
use std::collections::BTreeSet;

pub struct LabelTranslator<'a> {
    code_map: &'a CodeMap,
}

impl<'a> LabelTranslator<'a> {
    pub fn new(code_map: &'a CodeMap) -> Self {
        Self { code_map }
    }

    /// Turns card labels into the comparison string, one symbol per label,
    /// in submission order. Fails on the first label missing from the code map.
    pub fn translate<S: AsRef<str>>(&self, labels: &[S]) -> Result<String, SubmissionFault> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.code_map
                    .symbol(label)
                    .ok_or_else(|| SubmissionFault::UnknownLabel(label.to_string()))
            })
            .collect()
    }

    /// Every label across the batch that the code map cannot translate.
    pub fn unknown_labels(&self, submissions: &[Submission]) -> BTreeSet<String> {
        submissions
            .iter()
            .flat_map(|submission| submission.labels.iter())
            .filter(|label| !self.code_map.contains(label))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_map() -> CodeMap {
        [("A1", 'a'), ("A2", 'b'), ("A3", 'c'), ("A4", 'd'), ("A5", 'e')]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_translate_preserves_order() {
        let map = code_map();
        let translator = LabelTranslator::new(&map);

        assert_eq!(translator.translate(&["A1", "A2", "A3"]).unwrap(), "abc");
        assert_eq!(translator.translate(&["A2", "A1", "A3", "A4", "A5"]).unwrap(), "bacde");
    }

    #[test]
    fn test_translate_empty_sequence() {
        let map = code_map();
        let translator = LabelTranslator::new(&map);
        let labels: [&str; 0] = [];

        assert_eq!(translator.translate(&labels).unwrap(), "");
    }

    #[test]
    fn test_translate_unknown_label_fails() {
        let map = code_map();
        let translator = LabelTranslator::new(&map);

        assert_eq!(
            translator.translate(&["A1", "a2", "A9"]),
            Err(SubmissionFault::UnknownLabel("a2".to_string()))
        );
    }

    #[test]
    fn test_translate_repeated_labels() {
        let map = code_map();
        let translator = LabelTranslator::new(&map);

        assert_eq!(translator.translate(&["A3", "A3", "A3"]).unwrap(), "ccc");
    }

    #[test]
    fn test_unknown_labels_collects_whole_batch() {
        let map = code_map();
        let translator = LabelTranslator::new(&map);
        let submissions = vec![
            Submission {
                line: 1,
                identifier: "a@x.com".into(),
                labels: vec!["A1".into(), "B7".into()],
            },
            Submission {
                line: 2,
                identifier: "b@x.com".into(),
                labels: vec!["A6".into(), "B7".into(), "A2".into()],
            },
        ];

        let unknown: Vec<String> = translator.unknown_labels(&submissions).into_iter().collect();
        assert_eq!(unknown, vec!["A6".to_string(), "B7".to_string()]);
    }
}
