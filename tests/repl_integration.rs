// ABOUTME: Integration tests for REPL functionality

// Note: REPL integration tests are hard to automate in a meaningful way
// without mock input/output. The main REPL testing is done manually.
// These tests verify the underlying functionality that the REPL uses.

#[cfg(test)]
mod repl_tests {
    use slisp::parser::input_is_complete;

    #[test]
    fn test_repl_infrastructure_exists() {
        // This test just ensures the binary compiles successfully
        // The actual REPL tests are done via manual testing
        // No assertion needed - the test passing means compilation succeeded
    }

    #[test]
    fn test_input_completeness_drives_the_continuation_prompt() {
        assert!(!input_is_complete("(+ 1"));
        assert!(input_is_complete("(+ 1 2)"));
        assert!(!input_is_complete("\"unterminated"));
    }
}
