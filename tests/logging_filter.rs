// tests/logging_filter.rs

use jac::cli::LogLevel;
use jac::logging::{build_filter, filter_directives};
use tracing::level_filters::LevelFilter;

#[test]
fn cli_level_overrides_env_directives() {
    assert_eq!(
        filter_directives(Some(LogLevel::Warn), Some("jac::engine::tail=trace,info")),
        "warn"
    );
}

#[test]
fn env_directives_are_used_verbatim() {
    assert_eq!(
        filter_directives(None, Some(" jac::engine::tail=trace,info ")),
        "jac::engine::tail=trace,info"
    );
}

#[test]
fn defaults_to_info_when_unset_or_blank() {
    assert_eq!(filter_directives(None, None), "info");
    assert_eq!(filter_directives(None, Some("   ")), "info");
}

#[test]
fn per_module_directive_raises_the_ceiling() {
    let filter = build_filter(None, Some("jac::engine::tail=trace,info"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

    let filter = build_filter(Some(LogLevel::Error), Some("jac::engine::tail=trace"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
}

#[test]
fn unparsable_directives_fall_back_to_info() {
    let filter = build_filter(None, Some("jac=loudest"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
}
