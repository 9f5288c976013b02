use anyhow::Context;
use chrono::Local;
use college_calendar::{
    AcademicYear, CalendarConfig, CalendarEmitter, PageSource, RecordNormalizer,
    ScrapingContext, output, page::Page, page_store, pipeline, portal_scraper,
};
use log::{LevelFilter, error, info};

async fn fetch_pages(config: &CalendarConfig) -> anyhow::Result<Vec<Page>> {
    match &config.source {
        PageSource::Directory(dir) => page_store::load_pages(dir).await,
        PageSource::Portal(portal) => {
            let context = ScrapingContext::new(portal.clone()).await?;
            let pages = portal_scraper::scrape_all_pages(&context).await?;
            if config.save_html {
                page_store::save_pages(&config.html_dir(), &pages).await?;
            }
            Ok(pages)
        }
    }
}

async fn run(config: CalendarConfig) -> anyhow::Result<()> {
    let academic_year = AcademicYear::containing(Local::now().date_naive())?;
    info!("Academic year {academic_year}");

    let pages = fetch_pages(&config).await?;
    let normalizer = RecordNormalizer::new(academic_year)?;
    let emitter = CalendarEmitter::new(config.calendar_name.clone());
    let result = pipeline::run(&pages, &normalizer, &emitter)?;
    result.report.log();

    output::write_calendars(&config.output_dir, &result.calendars)
        .await
        .context("failed to write calendars")?;
    if config.write_json {
        output::write_sessions_json(&config.json_path(), &result.sessions).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = CalendarConfig::new()?;
    if let Err(e) = run(config).await {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}
