use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::common;

/// Extract videos and images from Amazon, eBay, Taobao, Tmall,
/// TaobaoWorld and 1688 product pages.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(disable_help_flag = true)]
pub struct CliArgs {
    /// Print help
    #[clap(action = ArgAction::Help, long)]
    help: Option<bool>,

    #[command(flatten)]
    pub request: common::RequestConfig,

    #[command(flatten)]
    pub extract: common::ExtractConfig,

    #[command(flatten)]
    pub cli: common::CliConfig,

    #[command(flatten)]
    pub run: common::RunConfig,
}
