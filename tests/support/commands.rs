//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables a developer shell might carry into the test process.
const INHERITED: &[&str] = &[
    "STASH_FILE",
    "STASH_SERVICE",
    "STASH_CONTEXT",
    "STASH_WARN",
    "STASH_LOG",
    "STASH_S3_BUCKET",
    "STASH_KMS_KEY_ID",
    "STASH_SECRETS",
    "STASH_GROUP_DELIMITER",
];

impl Test {
    /// Create a stash command with correct environment variables.
    ///
    /// Returns a Command configured with:
    /// - HOME and STASH_HOME inside the temporary home directory
    /// - Current directory set to the test project directory
    /// - A default bucket so s3 syncs never prompt
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("stash").expect("failed to find stash binary");
        for name in INHERITED {
            cmd.env_remove(name);
        }
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("STASH_HOME", self.home.path().join(".stash"));
        cmd.env("STASH_S3_BUCKET", "test-bucket");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run stash with arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run stash")
    }

    /// Run stash with arguments and piped stdin.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        self.cmd()
            .args(args)
            .write_stdin(stdin)
            .output()
            .expect("failed to run stash")
    }

    /// Shortcut for `stash get` with an output format.
    pub fn get(&self, output: &str, files: &[&str]) -> Output {
        let mut args = vec!["get", "-o", output];
        args.extend_from_slice(files);
        self.run(&args)
    }

    /// Shortcut for `stash list`.
    pub fn list(&self) -> Output {
        self.run(&["list"])
    }
}
