use std::path::PathBuf;

use clap::Args;
use splitter::items::LineItem;
use splitter_app::{
    config::ExtractorConfig,
    extraction::{GeminiConfig, GeminiExtractor, ReceiptExtractor, ReceiptImage},
};
use tracing::{info, warn};

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    /// Receipt photo (jpeg or png)
    image: PathBuf,

    #[command(flatten)]
    extractor: ExtractorConfig,
}

pub(crate) async fn run(context: &Context, args: AnalyzeArgs) -> Result<(), String> {
    let image = ReceiptImage::from_path(&args.image).map_err(|error| error.to_string())?;

    let extractor = GeminiExtractor::new(GeminiConfig {
        base_url: args.extractor.gemini_base_url,
        api_key: args.extractor.gemini_api_key,
        model: args.extractor.gemini_model,
    });

    let extracted = extractor
        .extract(&image)
        .await
        .map_err(|error| format!("failed to analyse receipt: {error}"))?;

    let items = extracted
        .into_iter()
        .map(|item| item.into_line_item(context.currency))
        .collect::<Result<Vec<LineItem<'_>>, _>>()
        .map_err(|error| format!("failed to read extracted items: {error}"))?;

    let flagged = items
        .iter()
        .filter(|item| item.needs_review(context.threshold))
        .count();

    info!(items = items.len(), "receipt analysed");

    if flagged > 0 {
        warn!(flagged, "some items were hard to read and need checking");
    }

    let mut session = context.load()?;
    session.replace_items(&items, &context.roster);
    context.save(&session)?;

    context.print_session(&session)
}
