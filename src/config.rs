// ABOUTME: Version info, banner text, and CLI usage text for the interpreter

#[allow(dead_code)]
pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Slisp 1.0";
pub const WELCOME_SUBTITLE: &str = "A small Lisp with runtime-registrable infix operators";

pub const USAGE_TEXT: &str = r#"Usage:
  slisp                       start the REPL
  slisp -h | -help | --help   print this message and exit
  slisp -i [code|script.slisp [args...]]
                               run inline code or a script, then enter the REPL
  slisp <code>                evaluate code and exit (when code does not end in .slisp)
  slisp <script.slisp> [args...]
                               run a script and exit; args become sys.args

In the REPL, `>>> ` prompts for a new form and `... ` continues an
unbalanced one. (quit) or (exit) ends the session.
"#;

#[allow(dead_code)]
pub const HELP_TEXT: &str = r#"
Available commands:
  (quit) or (exit)    - Exit the REPL
  (help)              - Show the quick function reference
  (help "name")       - Show detailed help for one function

Type any Slisp expression to evaluate it. Use Ctrl-D or (quit) to exit.
"#;
