//! Reordering rewrites the `order` field of each listed record

use std::collections::HashSet;
use tracing::{debug, info};

use crate::{
    error::{ApiError, ApiResult},
    models::ReorderRequest,
    pipeline::{require_document, write_document},
    state::AppState,
    validation::{parse_category, validate_id},
};

/// Drop repeated ids, keeping each id at its first position
pub fn dedupe_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Give each listed item its 1-based position as `order`.
///
/// Returns the number of records rewritten.
pub async fn reorder(state: &AppState, request: &ReorderRequest) -> ApiResult<usize> {
    let category = parse_category(&request.category)?;
    let ids = dedupe_ids(request.items.iter().map(|item| item.id.as_str()));
    if ids.is_empty() {
        return Err(ApiError::BadRequest("No items to reorder".to_string()));
    }
    for id in &ids {
        validate_id(id)?;
    }

    let mut storage = state.storage.open();

    // Every record must exist before anything is staged
    let mut documents = Vec::with_capacity(ids.len());
    for id in &ids {
        documents.push(require_document(&*storage, &state.layout, category, id).await?);
    }

    let mut rewritten = 0;
    for (position, (id, mut document)) in ids.iter().zip(documents).enumerate() {
        let order = position as i64 + 1;
        if document.record.order == order {
            continue;
        }

        debug!("Moving {}/{} from {} to {}", category, id, document.record.order, order);
        document.record.order = order;
        write_document(&mut *storage, &state.layout, category, id, &document).await?;
        rewritten += 1;
    }

    let commit = storage.publish(&format!("Reorder {}", category)).await?;
    state.build_hook.notify(commit.as_deref()).await;

    info!(
        "Reordered {} item(s) in {}, {} record(s) rewritten",
        ids.len(),
        category,
        rewritten
    );

    Ok(rewritten)
}
