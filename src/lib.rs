//! Breadcrumbs - a record of what went into a Packer image
//!
//! A Packer template names the files a build consumes: kickstart files,
//! provisioning scripts, ISO URLs. This crate finds those references in the
//! raw template text, resolves the template variables inside them, and
//! writes a self-contained snapshot that is uploaded onto the image:
//!
//! ```text
//! breadcrumbs/
//! ├── breadcrumbs.json    manifest: build info, git revision, OS, references
//! ├── <sha256>            the template itself
//! └── <dir>/<sha256>      one size-limited copy per referenced file
//! ```
//!
//! # Pipeline
//!
//! 1. [`template::scanner`] finds suffix-terminated references without
//!    parsing the template
//! 2. [`template::variables`] substitutes ``{{ user `name` }}`` values; a
//!    reference that still holds a special variable is located on disk by
//!    file name
//! 3. [`manifest`] classifies each reference, content-addresses it and
//!    records build metadata, the git revision ([`git`]) and the target OS
//!    ([`probe`])
//! 4. [`materializer`] writes the manifest and copies or downloads every
//!    file with private permissions
//! 5. [`provisioner`] strings the steps together and uploads the result
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - TOML configuration and command-line overrides
//! - [`core`] - Error types and user-facing error messages
//! - [`constants`] - Default limits, timeouts and file names
//! - [`utils`] - Hashing, JSON output, private files, bounded copies
//!
//! # Configuration (breadcrumbs.toml)
//!
//! ```toml
//! template_path = "centos7.json"
//! include_suffixes = [".ks", ".sh"]
//! packer_build_name = "centos7"
//! packer_builder_type = "virtualbox-iso"
//!
//! [packer_user_variables]
//! version = "0.0.1"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! breadcrumbs --config breadcrumbs.toml manifest
//! breadcrumbs --template centos7.json --suffix .ks create --output ./crumbs
//! breadcrumbs --config breadcrumbs.toml provision --target-root /mnt/image
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// Template analysis
pub mod template;

// Breadcrumbs
pub mod git;
pub mod manifest;
pub mod materializer;
pub mod probe;
pub mod provisioner;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
