use allergy_eye::{analyze, catalog, cli, config, logging};
use analyze::AnalyzeRequest;
use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("設定の読み込みに失敗しました")?;
    logging::init(cli.verbose, &config.log_filter);

    match cli.command {
        Commands::Analyze { response, scan_type, locale, allergies, profile, catalog: catalog_path, output } => {
            let taxonomy = catalog::load_taxonomy(catalog_path.as_deref(), &config)
                .context("カタログの読み込みに失敗しました")?;
            let profile = analyze::load_profile(profile.as_deref(), &allergies, &taxonomy)?;

            let text = std::fs::read_to_string(&response)
                .with_context(|| format!("応答ファイルを読めません: {}", response.display()))?;

            let request = AnalyzeRequest {
                scan_type,
                locale: match locale {
                    Some(locale) => locale,
                    None => config.resolved_locale()?,
                },
                profile,
                low_confidence_threshold: config.threshold()?,
                timestamp: chrono::Utc::now().timestamp_millis(),
            };
            let report = analyze::analyze_response(&taxonomy, &text, &request)?;

            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!(path = %path.display(), "scan report written");
                }
                None => println!("{}", json),
            }
        }

        Commands::Catalog { search, lang, locale, catalog: catalog_path } => {
            let taxonomy = catalog::load_taxonomy(catalog_path.as_deref(), &config)
                .context("カタログの読み込みに失敗しました")?;
            let locale = match locale {
                Some(locale) => locale,
                None => config.resolved_locale()?,
            };

            let ids: Vec<&str> = match search.as_deref() {
                Some(keyword) => taxonomy.find_ids_by_keyword(keyword, lang),
                None => taxonomy.get_all().iter().map(|r| r.id.as_str()).collect(),
            };

            if ids.is_empty() {
                println!("該当なし");
            }
            for id in ids {
                println!("{}\t{}", id, taxonomy.display_name(id, locale));
            }
        }

        Commands::Config { set_catalog, set_locale, set_threshold, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_catalog {
                config.catalog_path = Some(path);
                changed = true;
            }
            if let Some(locale) = set_locale {
                config.default_locale = locale.locale().into();
                changed = true;
            }
            if let Some(threshold) = set_threshold {
                config.low_confidence_threshold = threshold;
                changed = true;
            }

            if changed {
                config.validate()?;
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "組み込み".into())
                );
                println!("  ロケール: {}", config.default_locale);
                println!("  低確信度の閾値: {}", config.low_confidence_threshold);
                println!("  ログフィルタ: {}", config.log_filter);
            }
        }
    }

    Ok(())
}
