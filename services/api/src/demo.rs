use crate::infra::{load_stations, InMemoryStore};
use clap::Args;
use outreach::config::AppConfig;
use outreach::error::AppError;
use outreach::navigation::{AdminTab, Screen, ScreenEvent};
use outreach::store::{RestStoreClient, SubmissionRepository};
use outreach::workflows::completion::{
    AnalyticsView, CompletionService, RegionFilter, SubmissionsView, UnsubmittedView,
};
use outreach::workflows::domain::{ImageUpload, Region};
use outreach::workflows::submission::{SubmissionForm, SubmissionWorkflow};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Station CSV (lac,station_name[,id]) when no STORE_URL is configured
    #[arg(long)]
    pub(crate) stations: Option<PathBuf>,
    /// Restrict the outstanding station list to one LAC ("All" by default)
    #[arg(long)]
    pub(crate) lac: Option<RegionFilter>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Station CSV (lac,station_name[,id]); defaults to a built-in list
    #[arg(long)]
    pub(crate) stations: Option<PathBuf>,
    /// Region used for the sample submission (defaults to Dhemaji)
    #[arg(long)]
    pub(crate) region: Option<Region>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { stations, lac } = args;
    let filter = lac.unwrap_or_default();
    let config = AppConfig::load()?;

    if config.store.url.is_some() {
        let client = Arc::new(RestStoreClient::new(&config.store)?);
        print_report(&CompletionService::new(client), filter).await
    } else {
        let store = Arc::new(InMemoryStore::with_stations(load_stations(
            stations.as_deref(),
        )?));
        print_report(&CompletionService::new(store), filter).await
    }
}

async fn print_report<R>(
    service: &CompletionService<R>,
    filter: RegionFilter,
) -> Result<(), AppError>
where
    R: SubmissionRepository + 'static,
{
    let report = service.report().await?;
    render_analytics(&report.analytics());
    render_unsubmitted(&report.unsubmitted_view(filter));
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { stations, region } = args;
    let region = region.unwrap_or(Region::Dhemaji);

    let store = Arc::new(InMemoryStore::with_stations(load_stations(
        stations.as_deref(),
    )?));
    let workflow = SubmissionWorkflow::new(store.clone(), store.clone());
    let service = CompletionService::new(store.clone());

    println!("Outreach tracker demo");
    let choices = service.stations(region).await?;
    let Some(station) = choices.first() else {
        println!("- No polling stations on file for {region}");
        return Ok(());
    };
    println!(
        "- {} offers {} polling stations; submitting for '{}'",
        region,
        choices.len(),
        station.station_name
    );

    let screen = match Screen::Home
        .apply(ScreenEvent::SelectRegion { region })
        .and_then(|screen| screen.apply(ScreenEvent::Submit))
    {
        Ok(screen) => screen,
        Err(err) => {
            println!("  Navigation rejected: {err}");
            return Ok(());
        }
    };

    let incomplete = SubmissionForm {
        back_image: None,
        ..demo_form(region, &station.station_name)
    };
    if let Err(err) = workflow.submit(incomplete).await {
        println!("  Incomplete form rejected: {err}");
    }

    let outcome = workflow
        .submit(demo_form(region, &station.station_name))
        .await;
    let event = match &outcome {
        Ok(receipt) => {
            println!(
                "  Submission {} for {} / {}",
                receipt.status, receipt.lac, receipt.polling_station
            );
            println!("  Photos: {} | {}", receipt.front_image_url, receipt.back_image_url);
            println!("  Returning home after {} ms", receipt.redirect_after_ms);
            ScreenEvent::SubmissionSucceeded
        }
        Err(err) => {
            println!("  Submission failed: {err}");
            ScreenEvent::SubmissionFailed
        }
    };

    let mut screen = match screen.apply(event) {
        Ok(screen) => screen,
        Err(err) => {
            println!("  Navigation rejected: {err}");
            return Ok(());
        }
    };
    for event in [ScreenEvent::RedirectElapsed, ScreenEvent::OpenAdmin] {
        screen = match screen.apply(event) {
            Ok(next) => next,
            Err(err) => {
                println!("  Navigation rejected: {err}");
                return Ok(());
            }
        };
    }
    println!("  Stored assets: {}", store.asset_paths().len());

    for tab in AdminTab::ordered() {
        if let Ok(next) = screen.apply(ScreenEvent::SelectTab { tab }) {
            screen = next;
        }
        println!("\n[{}]", tab.label());
        match tab {
            AdminTab::Analytics => render_analytics(&service.analytics().await?),
            AdminTab::Submissions => render_submissions(&service.submissions().await?),
            AdminTab::Unsubmitted => {
                let report = service.report().await?;
                for filter in RegionFilter::options() {
                    let view = report.unsubmitted_view(filter);
                    println!("  {}: {} not submitted", filter.label(), view.stations.len());
                }
                render_unsubmitted(&report.unsubmitted_view(RegionFilter::All));
            }
        }
    }

    Ok(())
}

fn demo_form(region: Region, station: &str) -> SubmissionForm {
    let photo = |name: &str| ImageUpload::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]);
    SubmissionForm {
        lac: region,
        polling_station: station.to_string(),
        total_attendances: 58,
        venue: "Community hall".to_string(),
        eminent_guests: vec!["Gaon Burha".to_string(), "Block President".to_string()],
        front_image: Some(photo("front.jpg")),
        back_image: Some(photo("back.jpg")),
    }
}

pub(crate) fn render_analytics(view: &AnalyticsView) {
    println!("Completion by LAC");
    for entry in &view.regions {
        println!(
            "- {}: {} submissions | {} attendees | {}/{} stations ({})",
            entry.region_label,
            entry.submissions,
            entry.attendance,
            entry.submitted_stations,
            entry.total_stations,
            entry.completion_label
        );
    }
    let overall = &view.overall;
    println!(
        "- Overall: {} submissions | {} attendees | {}/{} stations ({})",
        overall.submissions,
        overall.attendance,
        overall.submitted_stations,
        overall.total_stations,
        overall.completion_label
    );
    if view.unrecognized_submissions > 0 {
        println!(
            "- {} submissions name a LAC outside the tracked regions",
            view.unrecognized_submissions
        );
    }
}

pub(crate) fn render_unsubmitted(view: &UnsubmittedView) {
    println!(
        "Outstanding stations ({}): {} in total",
        view.filter.label(),
        view.total_outstanding
    );
    for entry in &view.by_region {
        println!("  - {}: {}", entry.region_label, entry.outstanding);
    }
    if view.all_submitted {
        println!("  All polling stations have submitted");
        return;
    }
    for station in &view.stations {
        println!(
            "  * {} / {} [{}]",
            station.lac, station.station_name, station.status_label
        );
    }
}

pub(crate) fn render_submissions(view: &SubmissionsView) {
    println!("Submissions ({})", view.total);
    for entry in &view.submissions {
        println!(
            "- {} | {} / {} | {} attendees at {}",
            entry.submitted_on,
            entry.lac,
            entry.polling_station,
            entry.total_attendances,
            entry.venue
        );
        if !entry.eminent_guests.is_empty() {
            println!("  Guests: {}", entry.eminent_guests.join(", "));
        }
    }
}
