use axum::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::models::post::{Post, PostForm};
use diesel_async::RunQueryDsl;

use crate::schema;

use super::Pool;

/// Storage seam for posts. `find`/`update` return `None` and `delete` returns
/// `false` when the row does not exist; `Err` means the store itself failed.
#[async_trait]
pub trait PostService: Clone + Send + Sync + 'static {
    async fn list(&self) -> anyhow::Result<Vec<Post>>;
    async fn find(&self, post_id: i64) -> anyhow::Result<Option<Post>>;
    async fn create(&self, form: &PostForm) -> anyhow::Result<Post>;
    async fn update(&self, post_id: i64, form: &PostForm) -> anyhow::Result<Option<Post>>;
    async fn delete(&self, post_id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PostServiceDb {
    db: Pool,
}

impl PostServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostService for PostServiceDb {
    async fn list(&self) -> anyhow::Result<Vec<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let ps: Vec<Post> = posts
            .order(id.asc())
            .select(Post::as_select())
            .load(&mut conn)
            .await?;
        Ok(ps)
    }

    async fn find(&self, post_id: i64) -> anyhow::Result<Option<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let p = posts
            .find(post_id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(p)
    }

    async fn create(&self, form: &PostForm) -> anyhow::Result<Post> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;

        // created_at/updated_at come from the column defaults
        let post = diesel::insert_into(posts)
            .values(form)
            .get_result::<Post>(&mut conn)
            .await?;

        Ok(post)
    }

    async fn update(&self, post_id: i64, form: &PostForm) -> anyhow::Result<Option<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let post = diesel::update(posts.find(post_id))
            .set((
                title.eq(&form.title),
                content.eq(&form.content),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Post>(&mut conn)
            .await
            .optional()?;
        Ok(post)
    }

    async fn delete(&self, post_id: i64) -> anyhow::Result<bool> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let n = diesel::delete(posts.find(post_id)).execute(&mut conn).await?;
        Ok(n > 0)
    }
}
