use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use tera::Tera;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::flash;
use crate::helpers::validation_messages;
use crate::models::post::PostForm;
use crate::services::posts::PostService;

type PostsState<S> = (S, Tera);

async fn index<S: PostService>(
    State((svc, tera)): State<PostsState<S>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let posts = svc.list().await?;
    let (jar, message) = flash::take(jar);

    let mut ctx = tera::Context::new();
    ctx.insert("posts", &posts);
    if let Some(message) = message {
        ctx.insert("flash", &message);
    }
    Ok((jar, Html(tera.render("posts/index.html", &ctx)?)))
}

async fn create_form<S: PostService>(
    State((_, tera)): State<PostsState<S>>,
) -> Result<Html<String>, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("old", &PostForm::default());
    Ok(Html(tera.render("posts/create.html", &ctx)?))
}

#[tracing::instrument(skip_all)]
async fn create<S: PostService>(
    State((svc, tera)): State<PostsState<S>>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let mut ctx = tera::Context::new();
        ctx.insert("old", &form);
        ctx.insert("errors", &validation_messages(&errors));
        let html = tera.render("posts/create.html", &ctx)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
    }

    let post = svc.create(&form).await?;
    info!(id = post.id, "post created");

    let jar = flash::set(jar, "Post created successfully.");
    Ok((jar, Redirect::to("/posts")).into_response())
}

async fn show<S: PostService>(
    State((svc, tera)): State<PostsState<S>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let post = svc.find(id).await?.ok_or(AppError::NotFound)?;

    let mut ctx = tera::Context::new();
    ctx.insert("post", &post);
    Ok(Html(tera.render("posts/show.html", &ctx)?))
}

async fn edit_form<S: PostService>(
    State((svc, tera)): State<PostsState<S>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let post = svc.find(id).await?.ok_or(AppError::NotFound)?;

    let mut ctx = tera::Context::new();
    ctx.insert(
        "old",
        &PostForm {
            title: post.title.clone(),
            content: post.content.clone(),
        },
    );
    ctx.insert("post", &post);
    Ok(Html(tera.render("posts/edit.html", &ctx)?))
}

#[tracing::instrument(skip_all)]
async fn update<S: PostService>(
    State((svc, tera)): State<PostsState<S>>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = svc.find(id).await?.ok_or(AppError::NotFound)?;

    if let Err(errors) = form.validate() {
        let mut ctx = tera::Context::new();
        ctx.insert("old", &form);
        ctx.insert("post", &post);
        ctx.insert("errors", &validation_messages(&errors));
        let html = tera.render("posts/edit.html", &ctx)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
    }

    svc.update(id, &form).await?.ok_or(AppError::NotFound)?;
    info!(id, "post updated");

    let jar = flash::set(jar, "Post updated successfully.");
    Ok((jar, Redirect::to("/posts")).into_response())
}

#[tracing::instrument(skip_all)]
async fn destroy<S: PostService>(
    State((svc, _)): State<PostsState<S>>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !svc.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(id, "post deleted");

    let jar = flash::set(jar, "Post deleted successfully.");
    Ok((jar, Redirect::to("/posts")).into_response())
}

pub fn router<S: PostService>() -> Router<PostsState<S>> {
    Router::new()
        .route("/", get(index::<S>).post(create::<S>))
        .route("/create", get(create_form::<S>))
        .route(
            "/:id",
            get(show::<S>)
                .put(update::<S>)
                .patch(update::<S>)
                .delete(destroy::<S>),
        )
        .route("/:id/edit", get(edit_form::<S>))
}
