//! Handlers shared by every league resource (teams, players, ...).

use std::time::Duration;

use crease_core::crud::MIN_SEARCH_LEN;
use crease_core::{CoreError, CrudCollection, League, QueryParams, RecordId, Resource};

use crate::cli::{OutputFormat, ResourceArgs, ResourceCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

/// Collection for a single invocation: nothing to debounce, no auto-load.
fn one_shot(league: &League, resource: Resource) -> CrudCollection {
    league.collection_with(resource, |options| {
        options.debounce(Duration::ZERO).load_on_mount(false)
    })
}

pub async fn handle(
    league: &League,
    resource: Resource,
    args: ResourceArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let name = resource.to_string();
    let fail = |e: CoreError| CliError::from_core(e, &name, &ctx.profile);

    match args.command {
        ResourceCommand::List(list) => {
            let collection = one_shot(league, resource);
            let result = collection.get_all(list.to_params().into_query(), true).await;
            let total = collection.state().total;
            collection.close();

            let items = result.map_err(fail)?;
            let out = output::render_list(ctx.output, resource, &items);
            output::print_output(&out, ctx.quiet);

            let shown = u64::try_from(items.len()).unwrap_or(u64::MAX);
            if let Some(total) = total.filter(|t| *t > shown) {
                if ctx.output == OutputFormat::Table && !ctx.quiet {
                    eprintln!("Showing {shown} of {total}; use --page or --limit for more.");
                }
            }
            Ok(())
        }

        ResourceCommand::Search { term, list } => {
            if term.chars().count() < MIN_SEARCH_LEN {
                return Err(CliError::Validation {
                    field: "term".into(),
                    reason: format!("search needs at least {MIN_SEARCH_LEN} characters"),
                });
            }
            let collection = one_shot(league, resource);
            let result = collection.search(&term, list.to_params().into_query()).await;
            collection.close();

            let items = result.map_err(fail)?;
            let out = output::render_list(ctx.output, resource, &items);
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ResourceCommand::Get { id } => {
            let query = league.record_query(resource);
            let params = QueryParams::new().path("id", &id);
            let record = match query.update(params).await {
                Some(result) => result,
                None => query.refetch().await,
            }
            .map_err(fail)?;

            let out = output::render_single(ctx.output, &record);
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ResourceCommand::Create(payload) => {
            let body = util::read_payload(&payload)?;
            let created = league.create(resource, &body).await.map_err(fail)?;
            let out = output::render_single(ctx.output, &created);
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ResourceCommand::Update { id, payload } => {
            let body = util::read_payload(&payload)?;
            let updated = league
                .update(resource, &RecordId::from(id.as_str()), &body)
                .await
                .map_err(fail)?;
            let out = output::render_single(ctx.output, &updated);
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ResourceCommand::Delete { id } => {
            let prompt = format!("Delete {} {id}?", resource.label().to_lowercase());
            if !util::confirm(&prompt, &format!("{name} delete"), ctx.yes)? {
                eprintln!("Aborted.");
                return Ok(());
            }
            league
                .delete(resource, &RecordId::from(id.as_str()))
                .await
                .map_err(fail)?;
            Ok(())
        }
    }
}
