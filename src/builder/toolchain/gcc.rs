//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler, or to a launcher such as ccache
    pub cc: PathBuf,
    /// Words placed before every other argument (`gcc` in `ccache gcc`)
    pub cc_args: Vec<String>,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain {
            cc,
            cc_args: Vec::new(),
            family,
        }
    }

    /// Set the leading words of every command.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.cc_args = args;
        self
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.cc).args(self.cc_args.iter().cloned())
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = self.command();

        // Compile only, position independent for a shared object
        cmd = cmd.arg("-c").arg("-fPIC");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_module_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = self.command();

        if self.family == ToolchainPlatform::AppleClang {
            // interpreter symbols resolve at import time
            cmd = cmd.arg("-bundle").args(["-undefined", "dynamic_lookup"]);
        } else {
            cmd = cmd.arg("-shared");
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc() -> GccToolchain {
        GccToolchain::new(PathBuf::from("gcc"), ToolchainPlatform::Gcc)
    }

    #[test]
    fn test_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("build/cKing.c"),
            output: PathBuf::from("build/cKing.o"),
            include_dirs: vec![PathBuf::from("/usr/include/king"), PathBuf::from(".")],
            cflags: vec!["-O2".to_string()],
        };

        let cmd = gcc().compile_command(&input);
        assert_eq!(
            cmd.display(),
            "gcc -c -fPIC -I/usr/include/king -I. -O2 build/cKing.c -o build/cKing.o"
        );
    }

    #[test]
    fn test_link_module_command() {
        let input = LinkInput {
            objects: vec![PathBuf::from("build/cKing.o")],
            output: PathBuf::from("build/King.so"),
            lib_dirs: vec![PathBuf::from("/usr/lib")],
            libs: vec!["king".to_string(), "m".to_string()],
            ldflags: vec![],
        };

        let cmd = gcc().link_module_command(&input);
        assert_eq!(
            cmd.display(),
            "gcc -shared -o build/King.so build/cKing.o -L/usr/lib -lking -lm"
        );
    }

    #[test]
    fn test_launcher_words_lead_every_command() {
        let tc = GccToolchain::new(PathBuf::from("ccache"), ToolchainPlatform::Gcc)
            .with_args(vec!["gcc".to_string()]);
        let input = CompileInput {
            source: PathBuf::from("cKing.c"),
            output: PathBuf::from("cKing.o"),
            include_dirs: vec![],
            cflags: vec![],
        };

        assert_eq!(
            tc.compile_command(&input).display(),
            "ccache gcc -c -fPIC cKing.c -o cKing.o"
        );
    }

    #[test]
    fn test_apple_clang_links_bundle() {
        let tc = GccToolchain::new(PathBuf::from("clang"), ToolchainPlatform::AppleClang);
        let input = LinkInput {
            objects: vec![PathBuf::from("a.o")],
            output: PathBuf::from("King.so"),
            lib_dirs: vec![],
            libs: vec![],
            ldflags: vec![],
        };

        let cmd = tc.link_module_command(&input);
        assert_eq!(cmd.args[..3], ["-bundle", "-undefined", "dynamic_lookup"]);
    }
}
