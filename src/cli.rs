use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logic::model::ClusterPolicy;

/// Siyaj network-flow triage CLI
#[derive(Debug, Parser)]
#[command(name = "siyaj", about = "Network flow anomaly triage", version)]
pub struct Cli {
    /// Model artifact directory (overrides SIYAJ_MODEL_DIR)
    #[arg(long, global = true)]
    pub models: Option<PathBuf>,

    /// Alert quantile in (0, 1) (overrides SIYAJ_QUANTILE)
    #[arg(long, global = true)]
    pub quantile: Option<f64>,

    /// Number of evidence features (overrides SIYAJ_TOP_K)
    #[arg(long = "top-k", global = true)]
    pub top_k: Option<usize>,

    /// `minority` or `fixed:<cluster>` (overrides SIYAJ_CLUSTER_POLICY)
    #[arg(long = "cluster-policy", global = true)]
    pub cluster_policy: Option<ClusterPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score a batch and print the summary and per-row reports
    Score {
        /// JSON array or JSON Lines file of flow rows
        #[arg(long)]
        input: PathBuf,
    },
    /// Score a batch and print the alert for one row
    Alert {
        #[arg(long)]
        input: PathBuf,
        /// Zero-based row index
        #[arg(long)]
        row: usize,
        /// Attach playbook, knowledge lookups and a rendered explanation
        #[arg(long)]
        explain: bool,
    },
    /// Print the loaded feature schema layout
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alert_with_globals() {
        let cli = Cli::try_parse_from([
            "siyaj",
            "--quantile",
            "0.05",
            "alert",
            "--input",
            "flows.json",
            "--row",
            "3",
            "--explain",
            "--cluster-policy",
            "fixed:1",
        ])
        .unwrap();
        assert_eq!(cli.quantile, Some(0.05));
        assert_eq!(cli.cluster_policy, Some(ClusterPolicy::Fixed(1)));
        match cli.command {
            Commands::Alert { row, explain, .. } => {
                assert_eq!(row, 3);
                assert!(explain);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_policy() {
        assert!(Cli::try_parse_from(["siyaj", "--cluster-policy", "largest", "schema"]).is_err());
    }
}
