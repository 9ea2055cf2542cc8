//! Matching de patrones de exit code.
//!
//! `*` = cero o más caracteres, `?` = exactamente un carácter; el patrón
//! debe cubrir el código completo (no es búsqueda de substring).

pub fn matches(pattern: &str, code: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = code.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    // Último `*` visto y posición del texto desde la que reintentar.
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((star, mark)) = backtrack {
            pi = star + 1;
            ti = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// (cantidad de `*`, cantidad de `?`): menor es más específico.
pub fn wildcard_counts(pattern: &str) -> (usize, usize) {
    pattern.chars().fold((0, 0), |(stars, questions), c| match c {
                       '*' => (stars + 1, questions),
                       '?' => (stars, questions + 1),
                       _ => (stars, questions),
                   })
}
