use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

// form payload for create/update; the two fields are also the allow-list of
// client-settable columns
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, Insertable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostForm {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The title is required and may not be longer than 255 characters."
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "The content is required."))]
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
