//! Raw mirror → domain operations.

use tracing::debug;

use crate::decode::OperationRaw;
use crate::error::NormalizeError;
use crate::model::{Op, Operation, Path};
use crate::options::ParseOptions;

/// Normalize with default options. Output index `i` is input index `i`.
pub fn normalize(raw: &[OperationRaw]) -> Result<Vec<Operation>, NormalizeError> {
    normalize_with(raw, &ParseOptions::default())
}

pub fn normalize_with(raw: &[OperationRaw], options: &ParseOptions) -> Result<Vec<Operation>, NormalizeError> {
    let operations = raw
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_one(index, raw, options))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        operations = operations.len(),
        require_operands = options.require_operands,
        "normalized operations"
    );
    Ok(operations)
}

fn normalize_one(index: usize, raw: &OperationRaw, options: &ParseOptions) -> Result<Operation, NormalizeError> {
    let op: Op = raw.op.parse().map_err(|_| NormalizeError::UnknownOp {
        index,
        op: raw.op.clone(),
    })?;
    if options.require_operands {
        if op.takes_value() && raw.value.is_none() {
            return Err(NormalizeError::MissingValue { index, op });
        }
        if op.takes_from() && raw.from.is_none() {
            return Err(NormalizeError::MissingFrom { index, op });
        }
    }
    Ok(Operation {
        op,
        path: Path::parse(&raw.path),
        value: raw.value.clone(),
        from: raw.from.as_deref().map(Path::parse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_patch_node::Node;

    fn raw(op: &str, path: &str) -> OperationRaw {
        OperationRaw {
            op: op.into(),
            path: path.into(),
            value: None,
            from: None,
        }
    }

    #[test]
    fn carries_fields_through() {
        let input = vec![
            OperationRaw {
                value: Some(Node::from("x")),
                ..raw("add", "/a")
            },
            OperationRaw {
                from: Some("/a".into()),
                ..raw("move", "/b")
            },
            raw("remove", ""),
        ];
        let ops = normalize(&input).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::new(Op::Add, Path::parse("/a")).with_value("x"),
                Operation::new(Op::Move, Path::parse("/b")).with_from(Path::parse("/a")),
                Operation::new(Op::Remove, Path::root()),
            ]
        );
    }

    #[test]
    fn empty_from_is_present_root() {
        let input = vec![OperationRaw {
            from: Some(String::new()),
            ..raw("copy", "/x")
        }];
        assert_eq!(normalize(&input).unwrap()[0].from, Some(Path::root()));
    }

    #[test]
    fn is_pure() {
        let input = vec![raw("test", "/t"), raw("replace", "/r")];
        assert_eq!(normalize(&input), normalize(&input));
    }

    #[test]
    fn hand_built_unknown_tag_is_reported_with_its_index() {
        let input = vec![raw("add", "/a"), raw("patch", "/b")];
        assert_eq!(
            normalize(&input),
            Err(NormalizeError::UnknownOp {
                index: 1,
                op: "patch".into()
            })
        );
    }

    #[test]
    fn operands_are_only_checked_when_asked() {
        let input = vec![raw("remove", "/a"), raw("add", "/b"), raw("move", "/c")];
        assert!(normalize(&input).is_ok());
        assert_eq!(
            normalize_with(&input, &ParseOptions::strict()),
            Err(NormalizeError::MissingValue { index: 1, op: Op::Add })
        );
        let input = vec![raw("copy", "/c")];
        let err = normalize_with(&input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingFrom { index: 0, op: Op::Copy });
        assert_eq!(err.index(), 0);
    }
}
