use std::process;

use plume::{
    application::{error::AppError, posts::PaginatePostOptions},
    config::{self, Command, ListPostsArgs, PostsCommand},
    context::BlogContext,
    infra::telemetry,
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report("plume::main");
    if dispatcher::has_been_set() {
        error!(
            error = %error,
            kind = ?report.kind,
            chain = ?report.messages,
            "application error"
        );
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, kind = ?report.kind, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let context = BlogContext::connect(settings).await?;

    match cli_args.command.unwrap_or(Command::Check) {
        Command::Check => run_check(&context).await,
        Command::Posts(args) => match args.command {
            PostsCommand::List(list) => run_list_posts(&context, list).await,
            PostsCommand::Show { id } => run_show_post(&context, id).await,
        },
    }
}

async fn run_check(context: &BlogContext) -> Result<(), AppError> {
    let report = context.check().await;
    print_json(&report)?;

    if report.is_healthy() {
        info!(target = "plume::check", "store and cache are reachable");
        Ok(())
    } else {
        Err(AppError::unexpected("health check failed"))
    }
}

async fn run_list_posts(context: &BlogContext, args: ListPostsArgs) -> Result<(), AppError> {
    let page = context
        .posts()
        .list_published(PaginatePostOptions {
            user_id: args.user,
            current_page: args.page,
            posts_per_page: args.per_page,
        })
        .await?;

    print_json(&page)
}

async fn run_show_post(context: &BlogContext, id: Uuid) -> Result<(), AppError> {
    let post = context.posts().find(id).await?;
    print_json(&post)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
