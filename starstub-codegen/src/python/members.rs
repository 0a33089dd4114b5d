//! Discovery of the struct types reachable from generation targets.

use super::spec_type;
use crate::error::CodegenError;
use starstub_schema::{Kind, TypeId, Universe};
use std::collections::HashSet;

/// Collects every named struct reachable through the targets' `Spec` fields.
///
/// Targets are walked in the order given, fields in declaration order, and
/// each struct is recorded the first time it is reached, before its own
/// fields are walked. Pointer and slice wrappers are looked through. Time
/// fields are skipped.
///
/// # Errors
/// Returns `CodegenError` if a target has no usable `Spec` field.
pub fn find_struct_members(
    universe: &Universe,
    targets: &[TypeId],
) -> Result<Vec<TypeId>, CodegenError> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for &target in targets {
        let spec = spec_type(universe, target)?;
        for member in &spec.members {
            if universe.is_time_member(member) {
                continue;
            }
            visit(universe, member.type_id, &mut seen, &mut members);
        }
    }

    tracing::debug!("found {} member types", members.len());
    Ok(members)
}

fn visit(universe: &Universe, id: TypeId, seen: &mut HashSet<TypeId>, out: &mut Vec<TypeId>) {
    let ty = universe.get(id);
    match ty.kind {
        Kind::Pointer | Kind::Slice => {
            if let Some(elem) = ty.elem {
                visit(universe, elem, seen, out);
            }
        }
        Kind::Struct if ty.is_named() => {
            if !seen.insert(id) {
                return;
            }
            out.push(id);
            for member in &ty.members {
                if universe.is_time_member(member) {
                    continue;
                }
                visit(universe, member.type_id, seen, out);
            }
        }
        _ => {}
    }
}
