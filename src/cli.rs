use allergy_eye_common::{Language, ScanType};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "allergy-eye")]
#[command(about = "食物写真の過敏原検出結果をカタログ照合・プロフィール優先で整理するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像解析モデルの応答JSONを解決・並べ替えしてスキャン結果を出力
    Analyze {
        /// モデル応答ファイル（JSON、または ```json ブロックを含むテキスト）
        #[arg(required = true)]
        response: PathBuf,

        /// スキャン種別 (food/ingredients)
        #[arg(short = 't', long, default_value = "food")]
        scan_type: ScanType,

        /// ロケール (en/zh-CN/zh-TW)（省略時は設定値）
        #[arg(short, long)]
        locale: Option<Language>,

        /// 既知アレルギーID（複数指定可）
        #[arg(short, long = "allergy")]
        allergies: Vec<String>,

        /// プロフィールJSON（{"knownAllergies": [...]}）
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// 過敏原カタログJSON（省略時は設定値または組み込み）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// カタログを一覧・検索
    Catalog {
        /// 検索キーワード（部分一致）
        #[arg(short, long)]
        search: Option<String>,

        /// 検索対象の言語 (sc/tc/eng)（省略時は全言語）
        #[arg(long)]
        lang: Option<Language>,

        /// 表示名のロケール（省略時は設定値）
        #[arg(short, long)]
        locale: Option<Language>,

        /// 過敏原カタログJSON
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// カタログパスを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 既定ロケールを設定
        #[arg(long)]
        set_locale: Option<Language>,

        /// 低確信度の閾値を設定 (0〜1)
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
