//! Test fixtures for templates and configurations
//!
//! The CentOS 7 template exercises every scanner rule: quoted URLs, bare
//! relative paths, a space-delimited path inside a shell command and lines
//! full of variables that contain no reference at all.

use std::path::Path;

use crate::config::PluginConfig;

/// A Packer template for a CentOS 7 VirtualBox build.
///
/// It is deliberately not valid JSON in a few places; the scanner never parses it.
///
/// Expected references:
/// - `.ks`: `https://cool.com/centos/7/packer-generic.ks`, `abc-generic.ks`,
///   `/path/to/file/centos/7/def-generic.ks`
/// - `.sh`: `scripts/install-basic-utils.sh`, `scripts/install-cloud-init.sh`,
///   `scripts/cleanup.sh`
pub const CENTOS7_TEMPLATE: &str = r#"{
  "variables": {
    "vm_name": "centos7-template",
    "version": "0.0.1",
    "kickstart": "https://cool.com/centos/7/packer-generic.ks",
    "zero_the_disk": "false",
    "cloud_init": "false"
  },
  "builders": [
    {
      "type": "virtualbox-iso",
      "vm_name": "{{ user vm_name }}-{{ user version }}",
      "output_directory": "build",
      "disk_size": "100000",
      "guest_additions_mode": "disable",
      "guest_os_type": "RedHat_64",
      "hard_drive_interface": "sata",
      "headless": "true",
      "iso_urls": [
        "https://cool.com/iso/centos-7.5.1804-minimal-x86_64.iso"
      ],
      "iso_checksum": "714acc0aefb32b7d51b515e25546835e55a90da9fb00417fbee2d03a62801efd",
      "http_directory": "webroot",
      "boot_command": [
        "<tab><leftCtrlOn>ww<leftCtrlOff>cmdline ks={{ user kickstart }} PACKER_SSH_PUBLIC_KEY=\"{{ .SSHPublicKey }}\"<enter>"
      ],
      "ssh_username": "root",
      "ssh_wait_timeout": "10000s",
      "shutdown_command": "shutdown -P now",
      "vboxmanage": [
        [ "modifyvm", "{{.Name}}", "--memory", "1024" ],
        [ "modifyvm", "{{.Name}}", "--cpus", "1" ],
        [ "modifyvm", "{{.Name}}", "--paravirtprovider", "default" ],
        [ "modifyvm", "{{.Name}}", "--nictype1", "virtio" ],
        [ "storageattach", "{{.Name}}", "--storagectl", "SATA Controller", "--port", "1", "--device", "0", "--type", "dvddrive", "--medium", "emptydrive" ]
      ]
    }
  ],
  "provisioners": [
    {
      "type": "breadcrumbs"
      "abc": "abc-generic.ks",
    }
    {
      "type": "shell",
      "expect_disconnect": "true",
      "execute_command": "{{.Vars}} '{{.Path}}'",
      "scripts": [
        "scripts/install-basic-utils.sh",
        "scripts/install-cloud-init.sh",
        "scripts/cleanup.sh"
      ]
    },
  ],
  "post-processors": [
    "ova-forge"
    "def": "curl /path/to/file/centos/7/def-generic.ks | bash",
  ]
}
"#;

/// A configuration file selecting the CentOS 7 references.
pub const CENTOS7_CONFIG_TOML: &str = r#"
template_path = "centos7.json"
include_suffixes = [".ks", ".sh"]
packer_build_name = "centos7"
packer_builder_type = "virtualbox-iso"

[packer_user_variables]
version = "0.0.1"
"#;

/// Unvalidated configuration for `template` scanning `suffixes`.
pub fn plugin_config(template: &Path, suffixes: &[&str]) -> PluginConfig {
    let mut config = PluginConfig::default();
    config.template_path = template.to_path_buf();
    config.include_suffixes = suffixes.iter().map(|s| (*s).to_string()).collect();
    config
}
