use tracing_subscriber::EnvFilter;

/// ログ出力を初期化（標準エラー出力）
///
/// RUST_LOG があればそれを使い、なければ `--verbose` で debug、それ以外は設定値。
pub fn init(verbose: bool, default_filter: &str) {
    let fallback = if verbose { "debug" } else { default_filter };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}
