//! Integration tests for tomcat-home

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn tomcat_home() -> Command {
        cargo_bin_cmd!("tomcat-home")
    }

    #[test]
    fn help_displays() {
        tomcat_home()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Tomcat layer contributor"));
    }

    #[test]
    fn version_displays() {
        tomcat_home()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tomcat-home"));
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        tomcat_home()
            .args(["config", "path", "--config"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let temp = tempfile::TempDir::new().unwrap();
        tomcat_home()
            .arg("--config")
            .arg(temp.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[tomcat]"))
            .stdout(predicate::str::contains("CATALINA_HOME"));
    }

    #[test]
    fn build_help() {
        tomcat_home()
            .args(["build", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--layers"));
    }
}

mod buildpack_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use predicates::prelude::*;
    use sha2::{Digest, Sha256};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const CATALINA_SH: &str = "#!/bin/sh\n\n# Ensure that any user defined CLASSPATH variables are not used on startup,\n# but allow them to be specified in setenv.sh, in rare case when it is needed.\nCLASSPATH=\n\nexec \"$PRGDIR\"/\"$EXECUTABLE\" start \"$@\"\n";

    /// Buildpack workspace laid out in a temp dir
    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("buildpack")).unwrap();
            fs::create_dir_all(temp.path().join("layers")).unwrap();
            fs::write(
                temp.path().join("config.toml"),
                format!(
                    "[cache]\ndir = \"{}\"\noffline = true\n",
                    temp.path().join("cache").display()
                ),
            )
            .unwrap();
            fs::write(
                temp.path().join("plan.toml"),
                "[[entries]]\nname = \"tomcat\"\nversion = \"9.*\"\n",
            )
            .unwrap();
            Self { temp }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.temp.path().join(rel)
        }

        /// Write an archive and a buildpack.toml pointing at it
        fn publish(&self, version: &str, files: &[(&str, &str)], sha256: Option<&str>) {
            let archive = self.path(&format!("apache-tomcat-{}.tar.gz", version));
            write_tar_gz(&archive, version, files);
            let digest = hex::encode(Sha256::digest(fs::read(&archive).unwrap()));

            fs::write(
                self.path("buildpack/buildpack.toml"),
                format!(
                    r#"
[buildpack]
id = "org.example.tomcat"
version = "1.0.0"

[[metadata.dependencies]]
id = "tomcat"
name = "Apache Tomcat"
version = "{version}"
uri = "file://{uri}"
sha256 = "{sha}"
stacks = ["io.buildpacks.stacks.jammy"]
"#,
                    version = version,
                    uri = archive.display(),
                    sha = sha256.unwrap_or(&digest),
                ),
            )
            .unwrap();
        }

        fn build(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("tomcat-home");
            cmd.arg("--config")
                .arg(self.path("config.toml"))
                .arg("build")
                .arg("--layers")
                .arg(self.path("layers"))
                .arg("--plan")
                .arg(self.path("plan.toml"))
                .arg("--buildpack")
                .arg(self.path("buildpack"))
                .args(["--stack", "io.buildpacks.stacks.jammy"]);
            cmd
        }
    }

    fn write_tar_gz(path: &Path, version: &str, files: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(if name.ends_with(".sh") { 0o755 } else { 0o644 });
            header.set_cksum();
            builder
                .append_data(
                    &mut header,
                    format!("apache-tomcat-{}/{}", version, name),
                    contents.as_bytes(),
                )
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn build_contributes_layer_then_reuses_it() {
        let ws = Workspace::new();
        ws.publish(
            "9.0.90",
            &[("bin/catalina.sh", CATALINA_SH), ("lib/catalina.jar", "jar")],
            None,
        );

        ws.build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Layer populated"))
            .stdout(predicate::str::contains("CATALINA_HOME"));

        let root = ws.path("layers/tomcat");
        let script = fs::read_to_string(root.join("bin/catalina.sh")).unwrap();
        assert!(script.contains("\n#CLASSPATH=\n"));
        assert!(!script.contains("\nCLASSPATH=\n"));
        assert!(root.join("lib/catalina.jar").is_file());

        let env = fs::read_to_string(root.join("env.launch/CATALINA_HOME.override")).unwrap();
        assert_eq!(env, root.display().to_string());

        let record = fs::read_to_string(ws.path("layers/tomcat.toml")).unwrap();
        assert!(record.contains("launch = true"));
        assert!(record.contains("version = \"9.0.90\""));

        let launch = fs::read_to_string(ws.path("layers/launch.toml")).unwrap();
        assert_eq!(launch.matches("[[processes]]").count(), 3);
        assert_eq!(launch.matches("command = \"catalina.sh run\"").count(), 3);
        assert!(launch.contains("type = \"task\""));
        assert!(launch.contains("type = \"tomcat\""));
        assert!(launch.contains("type = \"web\""));

        // Marker proves the second build did not re-extract
        fs::write(root.join("marker"), "kept").unwrap();
        fs::remove_file(ws.path("layers/launch.toml")).unwrap();

        ws.build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Layer reused"));

        assert!(root.join("marker").is_file());
        assert!(ws.path("layers/launch.toml").is_file());
    }

    #[test]
    fn build_rejects_checksum_mismatch() {
        let ws = Workspace::new();
        ws.publish(
            "9.0.90",
            &[("bin/catalina.sh", CATALINA_SH)],
            Some("0000000000000000000000000000000000000000000000000000000000000000"),
        );

        ws.build()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Checksum mismatch"));

        assert!(!ws.path("layers/tomcat.toml").exists());
        assert!(!ws.path("layers/launch.toml").exists());
    }

    #[test]
    fn build_fails_without_startup_script() {
        let ws = Workspace::new();
        ws.publish("9.0.90", &[("lib/catalina.jar", "jar")], None);

        ws.build()
            .assert()
            .failure()
            .stderr(predicate::str::contains("catalina.sh"));

        assert!(!ws.path("layers/tomcat.toml").exists());
    }

    #[test]
    fn build_fails_for_unsatisfiable_plan() {
        let ws = Workspace::new();
        ws.publish("10.1.20", &[("bin/catalina.sh", CATALINA_SH)], None);

        ws.build()
            .assert()
            .failure()
            .stderr(predicate::str::contains("No dependency satisfies tomcat 9.*"));
    }

    #[test]
    fn detect_exit_codes() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.toml");

        cargo_bin_cmd!("tomcat-home")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .args(["detect", "--app"])
            .arg(temp.path())
            .arg("--plan")
            .arg(&plan)
            .assert()
            .code(100);

        fs::create_dir_all(temp.path().join("WEB-INF")).unwrap();

        cargo_bin_cmd!("tomcat-home")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .args(["detect", "--app"])
            .arg(temp.path())
            .arg("--plan")
            .arg(&plan)
            .assert()
            .success();

        assert!(fs::read_to_string(&plan).unwrap().contains("name = \"tomcat\""));
    }

    #[test]
    fn patch_command_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("catalina.sh");
        fs::write(&script, CATALINA_SH).unwrap();

        cargo_bin_cmd!("tomcat-home")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("patch")
            .arg(&script)
            .assert()
            .success()
            .stdout(predicate::str::contains("Patched"));
        let once = fs::read_to_string(&script).unwrap();

        cargo_bin_cmd!("tomcat-home")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("patch")
            .arg(&script)
            .assert()
            .success()
            .stdout(predicate::str::contains("already patched"));
        assert_eq!(fs::read_to_string(&script).unwrap(), once);
    }
}
