//!
//! confession resource
//! --------------------
//! The four public operations on confessions plus lookup by id. Each call is
//! stateless: the caller passes the subject id resolved for this request (if
//! any) and every precondition is checked in a fixed order before the store
//! is touched:
//!
//! - create: authentication, then text.
//! - update: authentication, text, existence, ownership.
//! - delete: authentication, existence, ownership.
//!
//! Update is a plain fetch-then-save with no version token. Two owners' requests
//! racing on the same document both succeed and the later save wins.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::identity::SubjectId;
use crate::storage::SharedStore;

mod model;
pub mod pagination;
mod validate;

pub use model::{Confession, ConfessionId, ConfessionPage, NewConfession};
pub use pagination::{total_pages, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use validate::validate_text;

fn require_subject(subject: Option<&SubjectId>) -> AppResult<&SubjectId> {
    subject.ok_or_else(AppError::authentication_required)
}

fn require_owner(confession: &Confession, subject: &SubjectId, action: &str) -> AppResult<()> {
    if confession.is_owned_by(subject) {
        return Ok(());
    }
    Err(AppError::forbidden("forbidden".to_string(), format!("Not authorized to {action} this confession")))
}

/// Confession resource API over an injected store handle.
#[derive(Clone)]
pub struct ConfessionService {
    store: SharedStore,
}

impl ConfessionService {
    pub fn new(store: SharedStore) -> Self { Self { store } }

    pub async fn create(&self, subject: Option<&SubjectId>, text: Option<&str>) -> AppResult<Confession> {
        let owner = require_subject(subject)?;
        let text = validate_text(text)?;
        let created = self
            .store
            .insert(NewConfession { text, owner_id: owner.clone(), created_at: Utc::now() })
            .await?;
        info!(target: "confessions", id = %created.id, "confession created");
        Ok(created)
    }

    pub async fn list(&self, req: PageRequest) -> AppResult<ConfessionPage> {
        let slice = self.store.find_page(req.skip(), req.limit).await?;
        debug!(target: "confessions", page = req.page, limit = req.limit, returned = slice.items.len(), "listing");
        Ok(ConfessionPage {
            confessions: slice.items,
            page: req.page,
            total_pages: total_pages(slice.total, req.limit),
            total_items: slice.total,
        })
    }

    pub async fn get(&self, id: &str) -> AppResult<Confession> {
        let id = ConfessionId::parse(id).ok_or_else(AppError::confession_not_found)?;
        self.store.find_by_id(&id).await?.ok_or_else(AppError::confession_not_found)
    }

    pub async fn update(&self, subject: Option<&SubjectId>, id: &str, text: Option<&str>) -> AppResult<Confession> {
        let subject = require_subject(subject)?;
        let text = validate_text(text)?;
        let mut confession = self.get(id).await?;
        require_owner(&confession, subject, "update")?;

        confession.text = text;
        confession.updated_at = Utc::now().max(confession.created_at);
        let saved = self.store.save(&confession).await?;
        info!(target: "confessions", id = %saved.id, "confession updated");
        Ok(saved)
    }

    pub async fn delete(&self, subject: Option<&SubjectId>, id: &str) -> AppResult<()> {
        let subject = require_subject(subject)?;
        let confession = self.get(id).await?;
        require_owner(&confession, subject, "delete")?;

        if !self.store.delete_by_id(&confession.id).await? {
            // removed by a concurrent request between fetch and delete
            return Err(AppError::confession_not_found());
        }
        info!(target: "confessions", id = %confession.id, "confession deleted");
        Ok(())
    }
}
