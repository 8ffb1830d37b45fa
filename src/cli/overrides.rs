//! Configuration flags shared by every subcommand

use clap::Args;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Flags that replace configuration file values.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Packer template to scan
    #[arg(short, long, global = true, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// File suffix to collect, e.g. `.ks` (repeatable)
    #[arg(short, long = "suffix", global = true, value_name = "SUFFIX")]
    pub suffixes: Vec<String>,

    /// User variable as `name=value` (repeatable)
    #[arg(long = "var", global = true, value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Directory to write breadcrumbs to instead of a temporary one
    #[arg(long, global = true, value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Directory on the target the breadcrumbs are uploaded into
    #[arg(long, global = true, value_name = "DIR")]
    pub upload_dir: Option<String>,

    /// Largest template accepted, in bytes
    #[arg(long, global = true, value_name = "BYTES")]
    pub template_size_bytes: Option<u64>,

    /// Largest file stored, in bytes
    #[arg(long, global = true, value_name = "BYTES")]
    pub save_file_size_bytes: Option<u64>,

    /// Packer build name recorded in the manifest
    #[arg(long, global = true, value_name = "NAME")]
    pub build_name: Option<String>,

    /// Packer builder type recorded in the manifest
    #[arg(long, global = true, value_name = "TYPE")]
    pub builder_type: Option<String>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            template_path: args.template,
            include_suffixes: args.suffixes,
            user_variables: args.vars,
            artifacts_dir_path: args.artifacts_dir,
            upload_dir_path: args.upload_dir,
            template_size_bytes: args.template_size_bytes,
            save_file_size_bytes: args.save_file_size_bytes,
            packer_build_name: args.build_name,
            packer_builder_type: args.builder_type,
        }
    }
}

/// Parses `name=value`. The value may contain `=`; the name may not be empty.
fn parse_var(s: &str) -> Result<(String, String), String> {
    let (name, value) =
        s.split_once('=').ok_or_else(|| format!("invalid variable '{s}': expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid variable '{s}': name is empty"));
    }
    Ok((name.to_string(), value.to_string()))
}
