//! Catalog validation logic.

use crate::schema::{Catalog, LATEST_VERSION, PartDef};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Part {id} contains itself through {path}")]
    Cycle { id: String, path: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    if catalog.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: catalog.version,
        });
    }

    if let Some(fresh_for_s) = catalog.settings.fresh_for_s
        && !(fresh_for_s > 0.0 && Duration::try_from_secs_f64(fresh_for_s).is_ok())
    {
        return Err(ValidationError::InvalidValue {
            field: "settings.fresh_for_s".to_string(),
            value: fresh_for_s.to_string(),
            reason: "must be a positive, representable number of seconds".to_string(),
        });
    }

    let mut part_ids = HashSet::new();
    for part in &catalog.parts {
        if part.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "parts.id".to_string(),
                value: format!("{:?}", part.id),
                reason: "must not be empty".to_string(),
            });
        }
        if !part_ids.insert(part.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: part.id.clone(),
                context: "parts".to_string(),
            });
        }
        validate_part(part)?;
    }

    for part in &catalog.parts {
        for child in &part.children {
            if !part_ids.contains(child.part.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: child.part.clone(),
                    context: format!("children of {}", part.id),
                });
            }
        }
    }

    check_acyclic(catalog)
}

fn validate_part(part: &PartDef) -> Result<(), ValidationError> {
    if !(part.cost.is_finite() && part.cost >= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.cost", part.id),
            value: part.cost.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }

    let mut child_ids = HashSet::new();
    for child in &part.children {
        if !child_ids.insert(child.part.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: child.part.clone(),
                context: format!("children of {}", part.id),
            });
        }
        if !(child.quantity.is_finite() && child.quantity > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.children.{}.quantity", part.id, child.part),
                value: child.quantity.to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn check_acyclic(catalog: &Catalog) -> Result<(), ValidationError> {
    let children: HashMap<&str, Vec<&str>> = catalog
        .parts
        .iter()
        .map(|p| {
            (
                p.id.as_str(),
                p.children.iter().map(|c| c.part.as_str()).collect(),
            )
        })
        .collect();

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for part in &catalog.parts {
        let mut path = Vec::new();
        visit(part.id.as_str(), &children, &mut marks, &mut path)?;
    }
    Ok(())
}

fn visit<'a>(
    id: &'a str,
    children: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Result<(), ValidationError> {
    match marks.get(id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            path.push(id);
            return Err(ValidationError::Cycle {
                id: id.to_string(),
                path: path.join(" -> "),
            });
        }
        None => {}
    }

    marks.insert(id, Mark::Visiting);
    path.push(id);
    for &child in children.get(id).map(Vec::as_slice).unwrap_or_default() {
        visit(child, children, marks, path)?;
    }
    path.pop();
    marks.insert(id, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CatalogSettings, ChildDef};

    fn part(id: &str, children: &[(&str, f64)]) -> PartDef {
        PartDef {
            id: id.to_string(),
            title: id.to_uppercase(),
            cost: 1.0,
            source: None,
            children: children
                .iter()
                .map(|(c, q)| ChildDef {
                    part: c.to_string(),
                    quantity: *q,
                })
                .collect(),
        }
    }

    fn catalog(parts: Vec<PartDef>) -> Catalog {
        Catalog {
            version: LATEST_VERSION,
            name: "test".to_string(),
            settings: CatalogSettings::default(),
            parts,
        }
    }

    #[test]
    fn accepts_diamond() {
        let c = catalog(vec![
            part("top", &[("left", 1.0), ("right", 2.0)]),
            part("left", &[("bottom", 1.0)]),
            part("right", &[("bottom", 3.0)]),
            part("bottom", &[]),
        ]);
        validate_catalog(&c).unwrap();
    }

    #[test]
    fn rejects_duplicate_part() {
        let c = catalog(vec![part("a", &[]), part("a", &[])]);
        assert!(matches!(
            validate_catalog(&c),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rejects_missing_child() {
        let c = catalog(vec![part("a", &[("ghost", 1.0)])]);
        let err = validate_catalog(&c).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReference { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn rejects_bad_quantity_and_cost() {
        let c = catalog(vec![part("a", &[("b", 0.0)]), part("b", &[])]);
        assert!(matches!(
            validate_catalog(&c),
            Err(ValidationError::InvalidValue { .. })
        ));

        let mut bad_cost = part("a", &[]);
        bad_cost.cost = f64::NAN;
        assert!(matches!(
            validate_catalog(&catalog(vec![bad_cost])),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_cycle() {
        let c = catalog(vec![
            part("a", &[("b", 1.0)]),
            part("b", &[("c", 1.0)]),
            part("c", &[("a", 1.0)]),
        ]);
        let err = validate_catalog(&c).unwrap_err();
        match err {
            ValidationError::Cycle { id, path } => {
                assert_eq!(id, "a");
                assert_eq!(path, "a -> b -> c -> a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unusable_fresh_window() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY, 1.0e300] {
            let mut c = catalog(vec![part("a", &[])]);
            c.settings.fresh_for_s = Some(value);
            assert!(
                matches!(validate_catalog(&c), Err(ValidationError::InvalidValue { .. })),
                "fresh_for_s = {value}"
            );
        }

        let mut c = catalog(vec![part("a", &[])]);
        c.settings.fresh_for_s = Some(86_400.0 * 365.0);
        validate_catalog(&c).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut c = catalog(vec![]);
        c.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_catalog(&c),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }
}
