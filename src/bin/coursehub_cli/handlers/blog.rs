#![deny(clippy::all, clippy::pedantic)]

use coursehub::infra::http::api::models::CommentCreateRequest;
use reqwest::Method;

use crate::args::BlogCmd;
use crate::client::{CliError, Ctx};
use crate::print;

pub async fn handle(ctx: &Ctx, cmd: BlogCmd) -> Result<(), CliError> {
    match cmd {
        BlogCmd::List {
            category_id,
            search,
            limit,
            offset,
        } => {
            let mut q = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
            if let Some(category_id) = category_id {
                q.push(("categoryId", category_id.to_string()));
            }
            if let Some(search) = search {
                q.push(("search", search));
            }
            let posts = ctx.get("api/blog/posts", &q).await?;
            print::blog_list(&posts);
        }
        BlogCmd::Show { id } => {
            let post = ctx.get(&format!("api/blog/posts/{id}"), &[]).await?;
            print::blog_detail(&post);
        }
        BlogCmd::Comment {
            id,
            content,
            parent,
        } => {
            let path = format!("api/blog/posts/{id}");
            let body = CommentCreateRequest {
                content,
                parent_id: parent,
            };
            ctx.send(
                Method::POST,
                &format!("{path}/comments"),
                Some(&body),
                &[&path],
            )
            .await?;
            println!("Comment posted.");
        }
    }
    Ok(())
}
