use super::test_support::build;
use crate::ir_frontend::analysis::var_checker::{CheckOptions, analyze_function, check_module};
use crate::ir_frontend::compiler_errors::ErrorType;
use crate::ir_frontend::ir::scope::ScopeBuilder;

const TWO_FUNCTIONS: &str = "
define i32 @broken(i32 %a) {
entry:
  ret i32 %a
}

define i32 @fine() {
entry:
  %y = add i32 %x, 1
  ret i32 %y
}
";

#[test]
fn missing_scope_entry_aborts_the_function() {
    let mut module = build(TWO_FUNCTIONS);
    module.functions[0].scope = ScopeBuilder::new().freeze();

    let error = analyze_function(&module.functions[0]).expect_err("scope is empty");
    assert_eq!(error.error_type, ErrorType::Analysis);
    assert!(error.msg.contains("%a"));
}

#[test]
fn failure_does_not_stop_the_rest_of_the_module() {
    let mut module = build(TWO_FUNCTIONS);
    module.functions[0].scope = ScopeBuilder::new().freeze();

    for parallel in [false, true] {
        let report = check_module(&module, &CheckOptions { parallel });

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].function, "broken");
        assert_eq!(report.stats.functions_failed, 1);
        assert_eq!(report.stats.functions_analyzed, 1);

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].function, "fine");
        assert!(!report.is_clean());
    }
}
