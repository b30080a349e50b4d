//! Split the flat walk of the `submodels` section into per-submodel buckets.

use crate::parser::IdentifierMap;
use crate::schema::Tag;
use crate::tree::Visit;

/// Content nodes of one submodel, tagged with its owning shell.
#[derive(Debug, Clone)]
pub struct SubmodelBucket<'t> {
    pub shell_name: String,
    pub submodel_short_name: String,
    /// Submodel id the bucket was resolved from.
    pub submodel_id: String,
    /// Every node below the submodel boundary except the `id` node.
    pub nodes: Vec<Visit<'t>>,
}

/// Result of [`partition`]: resolved buckets plus the submodels that could
/// not be attributed to a shell.
#[derive(Debug, Clone, Default)]
pub struct Partition<'t> {
    pub buckets: Vec<SubmodelBucket<'t>>,
    /// Ids (or `<unknown>` when the submodel carried none) of skipped submodels.
    pub unresolved: Vec<String>,
}

#[derive(Default)]
struct Pending<'t> {
    id: Option<String>,
    nodes: Vec<Visit<'t>>,
}

/// Partition a walk of the `submodels` section. The shallowest depth seen
/// marks submodel boundaries; an `id` node anywhere in the stream selects the
/// submodel the following nodes belong to.
pub fn partition<'t, I>(visits: I, identifiers: &IdentifierMap) -> Partition<'t>
where
    I: IntoIterator<Item = Visit<'t>>,
{
    let visits: Vec<Visit<'t>> = visits.into_iter().collect();
    let mut out = Partition::default();
    let Some(boundary) = visits.iter().map(|v| v.depth).min() else {
        return out;
    };

    let mut current: Option<Pending<'t>> = None;
    for visit in visits {
        if visit.depth == boundary {
            if let Some(done) = current.take() {
                emit(done, identifiers, &mut out);
            }
            current = Some(Pending::default());
            continue;
        }
        let pending = current.get_or_insert_with(Pending::default);
        if Tag::Id.matches(visit.node) {
            pending.id = visit.node.text().map(|t| t.to_string());
            continue;
        }
        pending.nodes.push(visit);
    }
    if let Some(done) = current {
        emit(done, identifiers, &mut out);
    }
    out
}

fn emit<'t>(pending: Pending<'t>, identifiers: &IdentifierMap, out: &mut Partition<'t>) {
    if pending.id.is_none() && pending.nodes.is_empty() {
        return;
    }
    let resolved = pending
        .id
        .as_deref()
        .and_then(|id| identifiers.get(id))
        .and_then(|ident| {
            ident
                .shell_name
                .clone()
                .map(|shell| (shell, ident.submodel_short_name.clone(), ident.id.clone()))
        });
    match resolved {
        Some((shell_name, submodel_short_name, submodel_id)) => {
            out.buckets.push(SubmodelBucket {
                shell_name,
                submodel_short_name,
                submodel_id,
                nodes: pending.nodes,
            });
        }
        None => out
            .unresolved
            .push(pending.id.unwrap_or_else(|| "<unknown>".to_string())),
    }
}
