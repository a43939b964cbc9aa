// tests/discovery_parsing.rs

use std::path::{Path, PathBuf};

use jac::process::{RunningProcess, parse_listing};

fn cwd() -> PathBuf {
    PathBuf::from("/srv/jac")
}

#[test]
fn keeps_only_archive_launched_jvms() {
    let output = "\
4711 /opt/billing/billing.jar -Xmx512m -Dserver.port=8081
4712 jdk.jcmd/sun.tools.jps.Jps -Dapplication.home=/usr/lib/jvm
4713 org.example.Main -Dfoo=bar
4714 /opt/orders/orders.jar
";

    let parsed = parse_listing(output, &cwd());

    assert_eq!(
        parsed,
        vec![
            RunningProcess {
                pid: 4711,
                executable_path: PathBuf::from("/opt/billing/billing.jar"),
            },
            RunningProcess {
                pid: 4714,
                executable_path: PathBuf::from("/opt/orders/orders.jar"),
            },
        ]
    );
}

#[test]
fn archive_suffix_is_case_insensitive() {
    let parsed = parse_listing("42 /opt/Legacy/LEGACY.JAR\n", &cwd());
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].executable_path, Path::new("/opt/Legacy/LEGACY.JAR"));
}

#[test]
fn relative_archive_paths_are_resolved_against_cwd() {
    let parsed = parse_listing("77 build/libs/app.jar -Xms64m\n", &cwd());
    assert_eq!(parsed[0].executable_path, cwd().join("build/libs/app.jar"));
}

#[test]
fn garbage_and_invalid_pids_are_skipped() {
    let output = "\
\n\
   \n\
notapid /opt/a/a.jar\n\
0 /opt/zero/zero.jar\n\
-5 /opt/neg/neg.jar\n\
12\n\
99999999999 /opt/huge/huge.jar\n\
13 /opt/ok/ok.jar\n\
";

    let parsed = parse_listing(output, &cwd());
    assert_eq!(
        parsed,
        vec![RunningProcess {
            pid: 13,
            executable_path: PathBuf::from("/opt/ok/ok.jar"),
        }]
    );
}

#[test]
fn windows_line_endings_are_tolerated() {
    let parsed = parse_listing("100 /opt/a/a.jar\r\n101 /opt/b/b.jar\r\n", &cwd());
    let pids: Vec<u32> = parsed.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![100, 101]);
}
