//! Change classification as data: one static mapping from change kind to
//! severity, kept apart from the diff algorithm so the policy can be read
//! and tested in isolation.

use crate::model::{ChangeKind, ChangeRecord, Severity};

pub fn severity_of(kind: ChangeKind) -> Severity {
    use ChangeKind::*;
    match kind {
        FunctionRemoved | ClassRemoved | MethodRemoved | ParameterRemoved | AttributeRemoved
        | ParameterTypeChanged | AttributeTypeChanged | ReturnTypeChanged
        | RequiredParameterAdded | DefaultRemoved | ParametersReordered => Severity::Major,

        FunctionAdded | ClassAdded | MethodAdded | OptionalParameterAdded | AttributeAdded
        | DefaultAdded => Severity::Minor,

        DefaultChanged | AnnotationAdded | AnnotationRemoved => Severity::Patch,
    }
}

/// Overall severity of a change set: the maximum over all records. An empty
/// set aggregates to `Severity::None`.
pub fn aggregate(changes: &[ChangeRecord]) -> Severity {
    changes
        .iter()
        .map(|c| severity_of(c.kind))
        .max()
        .unwrap_or(Severity::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangePath;

    fn record(kind: ChangeKind) -> ChangeRecord {
        ChangeRecord::new(kind, ChangePath::symbol("api.f"), None, None)
    }

    #[test]
    fn removals_and_signature_breaks_are_major() {
        for kind in [
            ChangeKind::FunctionRemoved,
            ChangeKind::ClassRemoved,
            ChangeKind::MethodRemoved,
            ChangeKind::ParameterRemoved,
            ChangeKind::AttributeRemoved,
            ChangeKind::ParameterTypeChanged,
            ChangeKind::AttributeTypeChanged,
            ChangeKind::ReturnTypeChanged,
            ChangeKind::RequiredParameterAdded,
            ChangeKind::DefaultRemoved,
            ChangeKind::ParametersReordered,
        ] {
            assert_eq!(severity_of(kind), Severity::Major, "{kind}");
        }
    }

    #[test]
    fn additive_changes_are_minor() {
        for kind in [
            ChangeKind::FunctionAdded,
            ChangeKind::ClassAdded,
            ChangeKind::MethodAdded,
            ChangeKind::OptionalParameterAdded,
            ChangeKind::AttributeAdded,
            ChangeKind::DefaultAdded,
        ] {
            assert_eq!(severity_of(kind), Severity::Minor, "{kind}");
        }
    }

    #[test]
    fn cosmetic_changes_are_patch() {
        for kind in [
            ChangeKind::DefaultChanged,
            ChangeKind::AnnotationAdded,
            ChangeKind::AnnotationRemoved,
        ] {
            assert_eq!(severity_of(kind), Severity::Patch, "{kind}");
        }
    }

    #[test]
    fn empty_change_set_aggregates_to_none() {
        assert_eq!(aggregate(&[]), Severity::None);
    }

    #[test]
    fn one_major_change_dominates_any_mix() {
        let mut changes = vec![
            record(ChangeKind::DefaultChanged),
            record(ChangeKind::FunctionAdded),
            record(ChangeKind::AnnotationAdded),
        ];
        assert_eq!(aggregate(&changes), Severity::Minor);

        changes.push(record(ChangeKind::ParameterRemoved));
        assert_eq!(aggregate(&changes), Severity::Major);
    }
}
