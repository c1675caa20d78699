//! Integer literals of a program, used as landmarks for interval widening.

use crate::il::Program;
use std::collections::BTreeSet;

/// Every "interesting" integer of a program.
///
/// These are the decimal integer literals written in the Java sources of the
/// program's classes, and the integers its bytecode pushes or adds to locals.
pub fn interesting_values(program: &Program) -> BTreeSet<i64> {
    let mut values = BTreeSet::new();

    for class in program.classes() {
        if let Some(source) = class.source() {
            values.extend(decimal_literals(source));
        }
    }

    for method in program.all_methods() {
        values.extend(
            method
                .bytecode()
                .iter()
                .filter_map(|instruction| instruction.integer_literal()),
        );
    }

    trace!("{} interesting values", values.len());

    values
}

/// The decimal integer literals of Java source text.
///
/// Comments, string literals and character literals are skipped, as are
/// hexadecimal, octal, binary and floating point literals. A literal is
/// never negative: the minus of `-1` is an operator.
pub fn decimal_literals(source: &str) -> Vec<i64> {
    let chars = source.chars().collect::<Vec<char>>();
    let mut literals = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '"' | '\'' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
            }
            c if c.is_ascii_digit() => {
                let start = i;
                i = skip_word(&chars, i);
                let token = chars[start..i].iter().collect::<String>();

                let mut floating = false;
                if chars.get(i) == Some(&'.') {
                    floating = true;
                    i = skip_word(&chars, i + 1);
                }
                // 1e-3 and 2.5E+2
                let exponent = matches!(chars[i - 1], 'e' | 'E');
                if exponent && matches!(chars.get(i), Some(&'+') | Some(&'-')) {
                    floating = true;
                    i = skip_word(&chars, i + 1);
                }

                if !floating {
                    if let Some(value) = decimal_literal(&token) {
                        literals.push(value);
                    }
                }
            }
            _ => i += 1,
        }
    }

    literals
}

fn skip_word(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    i
}

fn decimal_literal(token: &str) -> Option<i64> {
    let digits = token.trim_end_matches(|c| c == 'l' || c == 'L');
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if digits.ends_with('_') || !digits.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }
    digits.replace('_', "").parse::<i64>().ok()
}
