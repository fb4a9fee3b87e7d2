//! skilline_script: front end for the skill-line language.
//!
//! A skill line is a one-line program such as
//!
//! ```text
//! damage{amount=10;type=magic} @PIR{r=5} ~onTimer:100 ?day <50% 0.8
//! ```
//!
//! naming a mechanic with parameters, a targeter, a trigger, inline
//! conditions, a health gate and a chance. This crate tokenizes and parses
//! such lines into [`skilline_data::SkillLineAst`], renders ASTs back to
//! canonical text, completes partially typed lines, and reads project files
//! whose mobs and metaskills carry skill lines.
//!
//! ```
//! use skilline_script::{generate_skill_line, parse_skill_line};
//!
//! let src = "effect:particles{p=flame;a=20} @PIR{r=5} ~onTimer:100";
//! let out = parse_skill_line(src).expect("lex");
//! assert!(out.is_ok());
//! assert_eq!(generate_skill_line(&out.ast), src);
//! ```

pub mod complete;
pub mod config;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod project;

pub use generator::{generate_skill_line, render_skill_block};
pub use lexer::{LexError, Token, TokenKind, tokenize};
pub use parser::{
    BlockLine, ParseError, ParseOutcome, ParseWarning, Parser, ParserOptions, parse_skill_block, parse_skill_line,
    parse_skill_line_with,
};
pub use project::{LineDiagnostic, LoadedProject, ProjectError, format_project, load_project, parse_project};
