use clap::Parser;
use dialoguer::{Confirm, Select};
use fleetcheck::backend::{InspectionStore, SupabaseStore, WebhookNotifier};
use fleetcheck::cli::{Cli, Commands};
use fleetcheck::compressor::{ImageCompressor, PhotoFile};
use fleetcheck::config::Config;
use fleetcheck::error::{FleetCheckError, Result, SubmissionError};
use fleetcheck::i18n::{Locale, Message};
use fleetcheck::scanner;
use fleetcheck::selection::{AssignmentLoad, Roster};
use fleetcheck::submission::{SubmissionController, SubmissionSettings};
use fleetcheck_common::{Driver, PhotoSlot, RecordId, Vehicle};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            println!("✗ {}", e.localized(Locale::default()));
            return Err(anyhow::Error::new(e).context("設定ファイルの読み込みに失敗しました"));
        }
    };
    let locale = config.language;

    if let Err(e) = run(cli.command, config).await {
        // 個別に表示済みのエラーは FleetCheckError 以外で返る
        if let Some(error) = e.downcast_ref::<FleetCheckError>() {
            println!("✗ {}", error.localized(locale));
        }
        return Err(e);
    }

    Ok(())
}

async fn run(command: Commands, mut config: Config) -> anyhow::Result<()> {
    let locale = config.language;

    match command {
        Commands::Drivers => {
            let store = build_store(&config)?;
            let drivers = match store.list_active_drivers().await {
                Ok(drivers) => drivers,
                Err(e) => {
                    println!("✗ {}", Message::LoadDriversFailed.text(locale));
                    return Err(e.into());
                }
            };

            if drivers.is_empty() {
                println!("{}", Message::NoDrivers.text(locale));
            }
            for driver in &drivers {
                println!("  {}\t{}", driver.id, driver.label());
            }
        }

        Commands::Vehicles { driver } => {
            let store = build_store(&config)?;
            let vehicles = match store.list_assigned_vehicles(&RecordId::new(driver)).await {
                Ok(vehicles) => vehicles,
                Err(e) => {
                    println!("✗ {}", Message::LoadVehiclesFailed.text(locale));
                    return Err(e.into());
                }
            };

            if vehicles.is_empty() {
                println!("{}", Message::NoVehiclesAssigned.text(locale));
            }
            for vehicle in &vehicles {
                println!("  {}\t{}\t{}", vehicle.id, vehicle.label(), vehicle.location);
            }
        }

        Commands::Submit {
            driver,
            vehicle,
            photos_dir,
            front,
            back,
            right,
            left,
            notes,
            accept_declaration,
        } => {
            println!("🚐 fleetcheck - 点検送信\n");

            let mut controller = SubmissionController::new(
                Arc::new(build_store(&config)?),
                Arc::new(WebhookNotifier::new(&config.webhook_url()?, config.timeout()).map_err(FleetCheckError::from)?),
            )
            .with_settings(SubmissionSettings {
                timeout: config.timeout(),
                reset_delay: config.reset_delay(),
                ..SubmissionSettings::default()
            })
            .with_compressor(ImageCompressor::new(config.compression_settings()));

            // 1. 運転者
            println!("[1/4] 運転者を選択");
            if let Err(e) = controller.load_drivers().await {
                println!("✗ {}", Message::LoadDriversFailed.text(locale));
                return Err(e.into());
            }
            if controller.drivers().is_empty() {
                println!("{}", Message::NoDrivers.text(locale));
                return Ok(());
            }

            let load = match driver {
                Some(id) => controller.choose_driver_by_id(&RecordId::new(id)).await,
                None => {
                    let picked = pick_driver(controller.drivers(), locale)?;
                    controller.choose_driver(Some(picked)).await
                }
            };
            let load = match load {
                Ok(load) => load,
                Err(FleetCheckError::Transport(e)) => {
                    println!("✗ {}", Message::LoadVehiclesFailed.text(locale));
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };

            // 2. 車両
            println!("[2/4] 車両を選択");
            match load {
                AssignmentLoad::Empty | AssignmentLoad::Stale => {
                    println!("{}", Message::NoVehiclesAssigned.text(locale));
                    return Ok(());
                }
                AssignmentLoad::AutoSelected(v) => {
                    println!("✔ {}: {}", Message::SingleVehicleAssigned.text(locale), v.label());
                }
                AssignmentLoad::Choices(n) => {
                    println!("{} {}", n, Message::VehiclesAssigned.text(locale));
                }
            }

            if let Some(id) = vehicle {
                controller
                    .choose_vehicle_by_id(&RecordId::new(id))
                    .map_err(FleetCheckError::from)?;
            } else if controller.selection().vehicle().is_none() {
                let picked = pick_vehicle(controller.selection().assignments(), locale)?;
                controller.choose_vehicle(Some(picked)).map_err(FleetCheckError::from)?;
            }

            // 3. 写真
            println!("[3/4] 写真を圧縮中...");
            let files = collect_photo_files(photos_dir, [front, back, right, left])?;
            for (slot, result) in controller.attach_photos(files).await {
                match result {
                    Ok(()) => println!("✔ {}: {}", slot, Message::PhotoUploaded.text(locale)),
                    Err(e) => println!("✗ {}: {}", slot, e.localized(locale)),
                }
            }
            println!("  {}/4", controller.photos().filled_count());

            controller.set_notes(notes.unwrap_or_default());
            println!("  {}", controller.notes_counter(locale));

            let accepted = accept_declaration
                || Confirm::new()
                    .with_prompt(Message::DeclarationPrompt.text(locale))
                    .default(false)
                    .interact()
                    .map_err(FleetCheckError::from)?;
            controller.set_declaration(accepted);

            // 4. 送信
            println!("[4/4] 送信中...");
            loop {
                let spinner = submitting_spinner(locale);
                let result = controller.submit().await;
                spinner.finish_and_clear();

                match result {
                    Ok(receipt) => {
                        println!("✅ {} ({})", Message::SubmissionSucceeded.text(locale), receipt.inspection_code);
                        controller.finish().await;
                        break;
                    }
                    Err(e @ (SubmissionError::Validation(_) | SubmissionError::Busy)) => {
                        println!("✗ {}", e.localized(locale));
                        return Err(e.into());
                    }
                    Err(e) => {
                        println!("✗ {}", e.localized(locale));
                        let retry = Confirm::new()
                            .with_prompt(Message::RetryPrompt.text(locale))
                            .default(true)
                            .interact()
                            .map_err(FleetCheckError::from)?;
                        if !retry {
                            return Err(e.into());
                        }
                    }
                }
            }
        }

        Commands::Compress { file, output } => {
            let photo_file = scanner::read_photo_file(&file)?;
            let photo = ImageCompressor::new(config.compression_settings())
                .compress(photo_file)
                .await
                .map_err(FleetCheckError::from)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &photo.encoded_image).map_err(FleetCheckError::from)?;
                    println!(
                        "✔ {} ({} bytes → {} chars): {}",
                        photo.original_filename,
                        photo.original_byte_size,
                        photo.encoded_image.len(),
                        path.display()
                    );
                }
                None => println!("{}", photo.encoded_image),
            }
        }

        Commands::Config {
            show,
            set_store_url,
            set_store_key,
            set_webhook_url,
            set_timeout,
        } => {
            let mut changed = false;

            if let Some(url) = set_store_url {
                config.store_url = Some(url);
                changed = true;
                println!("✔ データストアURLを設定しました");
            }
            if let Some(key) = set_store_key {
                config.store_api_key = Some(key);
                changed = true;
                println!("✔ データストアAPIキーを設定しました");
            }
            if let Some(url) = set_webhook_url {
                config.webhook_url = Some(url);
                changed = true;
                println!("✔ Webhook URLを設定しました");
            }
            if let Some(seconds) = set_timeout {
                config.timeout_seconds = seconds;
                changed = true;
                println!("✔ タイムアウトを{}秒に設定しました", seconds);
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  データストアURL: {}", config.store_url.as_deref().unwrap_or("未設定"));
                println!(
                    "  データストアAPIキー: {}",
                    if config.store_api_key.is_some() { "設定済み" } else { "未設定" }
                );
                println!("  Webhook URL: {}", config.webhook_url.as_deref().unwrap_or("未設定"));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  最大幅: {}px / JPEG品質: {}", config.max_width, config.jpeg_quality);
                println!("  言語: {}", config.language);
            }
        }

        Commands::Language { locale: requested } => {
            let next = requested.unwrap_or_else(|| config.language.toggled());
            config.set_language(next)?;
            println!("✔ {}: {}", Message::LanguageChanged.text(next), next);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fleetcheck=debug,fleetcheck_common=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_store(config: &Config) -> Result<SupabaseStore> {
    Ok(SupabaseStore::new(
        &config.store_url()?,
        &config.store_api_key()?,
        config.timeout(),
    )?)
}

fn pick_driver(drivers: &Roster<Driver>, locale: Locale) -> Result<Driver> {
    let labels: Vec<String> = drivers.entries().iter().map(Driver::label).collect();
    let index = Select::new()
        .with_prompt(Message::SelectDriver.text(locale))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(drivers.entries()[index].clone())
}

fn pick_vehicle(vehicles: &Roster<Vehicle>, locale: Locale) -> Result<Vehicle> {
    let labels: Vec<String> = vehicles.entries().iter().map(Vehicle::label).collect();
    let index = Select::new()
        .with_prompt(Message::SelectVehicle.text(locale))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(vehicles.entries()[index].clone())
}

/// フォルダ内の写真と個別指定をまとめる（個別指定が優先）
fn collect_photo_files(
    photos_dir: Option<PathBuf>,
    explicit: [Option<PathBuf>; 4],
) -> Result<Vec<(PhotoSlot, PhotoFile)>> {
    let mut paths: Vec<(PhotoSlot, PathBuf)> = match photos_dir {
        Some(dir) => scanner::scan_photo_folder(&dir)?,
        None => Vec::new(),
    };

    for (slot, path) in PhotoSlot::ALL.into_iter().zip(explicit) {
        if let Some(path) = path {
            paths.retain(|(s, _)| *s != slot);
            paths.push((slot, path));
        }
    }

    paths
        .into_iter()
        .map(|(slot, path)| Ok((slot, scanner::read_photo_file(&path)?)))
        .collect()
}

fn submitting_spinner(locale: Locale) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(Message::Submitting.text(locale));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
