use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::models::post::{Post, PostForm};

use super::posts::PostService;

/// In-memory post store, used when no database is configured and by the test
/// suite. Ids are assigned from the same monotonic counter a serial column
/// would provide. Data is lost on process restart.
#[derive(Clone, Default)]
pub struct PostServiceMem {
    rows: Arc<DashMap<i64, Post>>,
    next_id: Arc<AtomicI64>,
}

impl PostServiceMem {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostService for PostServiceMem {
    async fn list(&self) -> anyhow::Result<Vec<Post>> {
        let mut ps: Vec<Post> = self.rows.iter().map(|r| r.value().clone()).collect();
        ps.sort_by_key(|p| p.id);
        Ok(ps)
    }

    async fn find(&self, post_id: i64) -> anyhow::Result<Option<Post>> {
        Ok(self.rows.get(&post_id).map(|r| r.value().clone()))
    }

    async fn create(&self, form: &PostForm) -> anyhow::Result<Post> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let post = Post {
            id,
            title: form.title.clone(),
            content: form.content.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, post_id: i64, form: &PostForm) -> anyhow::Result<Option<Post>> {
        let updated = self.rows.get_mut(&post_id).map(|mut r| {
            let p = r.value_mut();
            p.title = form.title.clone();
            p.content = form.content.clone();
            p.updated_at = Utc::now();
            p.clone()
        });
        Ok(updated)
    }

    async fn delete(&self, post_id: i64) -> anyhow::Result<bool> {
        Ok(self.rows.remove(&post_id).is_some())
    }
}
