// HWP equation script to LaTeX
//
// The script language is whitespace separated. `{}` groups, `^`/`_` (or the
// words `sup`/`sub`) attach scripts to the preceding operand, `over` is infix,
// layout words such as `sqrt` and `matrix` take operands to their right, and
// the remaining keywords are symbols. Unknown words are variables.

use phf::phf_map;

/// Keyword symbols, operators and function names. Keys are lowercase.
static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    // Big operators
    "sum" => "\\sum",
    "prod" => "\\prod",
    "coprod" => "\\coprod",
    "int" => "\\int",
    "dint" => "\\iint",
    "tint" => "\\iiint",
    "oint" => "\\oint",
    "bigcup" => "\\bigcup",
    "bigcap" => "\\bigcap",
    "lim" => "\\lim",
    "limsup" => "\\limsup",
    "liminf" => "\\liminf",

    // Functions
    "sin" => "\\sin",
    "cos" => "\\cos",
    "tan" => "\\tan",
    "cot" => "\\cot",
    "sec" => "\\sec",
    "csc" => "\\csc",
    "sinh" => "\\sinh",
    "cosh" => "\\cosh",
    "tanh" => "\\tanh",
    "coth" => "\\coth",
    "arcsin" => "\\arcsin",
    "arccos" => "\\arccos",
    "arctan" => "\\arctan",
    "log" => "\\log",
    "ln" => "\\ln",
    "lg" => "\\lg",
    "exp" => "\\exp",
    "det" => "\\det",
    "dim" => "\\dim",
    "gcd" => "\\gcd",
    "ker" => "\\ker",
    "max" => "\\max",
    "min" => "\\min",
    "mod" => "\\bmod",

    // Operators and relations
    "times" => "\\times",
    "div" => "\\div",
    "cdot" => "\\cdot",
    "circ" => "\\circ",
    "pm" => "\\pm",
    "mp" => "\\mp",
    "leq" => "\\leq",
    "le" => "\\leq",
    "geq" => "\\geq",
    "ge" => "\\geq",
    "neq" => "\\neq",
    "ne" => "\\neq",
    "ll" => "\\ll",
    "gg" => "\\gg",
    "approx" => "\\approx",
    "equiv" => "\\equiv",
    "sim" => "\\sim",
    "simeq" => "\\simeq",
    "cong" => "\\cong",
    "propto" => "\\propto",
    "subset" => "\\subset",
    "supset" => "\\supset",
    "subseteq" => "\\subseteq",
    "supseteq" => "\\supseteq",
    "in" => "\\in",
    "notin" => "\\notin",
    "owns" => "\\ni",
    "cup" => "\\cup",
    "cap" => "\\cap",
    "setminus" => "\\setminus",
    "emptyset" => "\\emptyset",
    "land" => "\\land",
    "lor" => "\\lor",
    "lnot" => "\\lnot",
    "forall" => "\\forall",
    "exist" => "\\exists",
    "exists" => "\\exists",
    "therefore" => "\\therefore",
    "because" => "\\because",
    "perp" => "\\perp",
    "parallel" => "\\parallel",
    "angle" => "\\angle",
    "triangle" => "\\triangle",

    // Arrows
    "rarrow" => "\\rightarrow",
    "larrow" => "\\leftarrow",
    "lrarrow" => "\\leftrightarrow",
    "uparrow" => "\\uparrow",
    "downarrow" => "\\downarrow",
    "mapsto" => "\\mapsto",

    // Dots and misc
    "cdots" => "\\cdots",
    "ldots" => "\\ldots",
    "vdots" => "\\vdots",
    "ddots" => "\\ddots",
    "inf" => "\\infty",
    "infty" => "\\infty",
    "partial" => "\\partial",
    "nabla" => "\\nabla",
    "prime" => "'",
    "deg" => "^{\\circ}",
    "hbar" => "\\hbar",
    "aleph" => "\\aleph",
    "lbrace" => "\\{",
    "rbrace" => "\\}",
    "langle" => "\\langle",
    "rangle" => "\\rangle",
    "lfloor" => "\\lfloor",
    "rfloor" => "\\rfloor",
    "lceil" => "\\lceil",
    "rceil" => "\\rceil",
};

/// Greek letters: lowercase name to (lowercase, uppercase) forms. A word
/// starting with a capital selects the uppercase form.
static GREEK: phf::Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "alpha" => ("\\alpha", "A"),
    "beta" => ("\\beta", "B"),
    "gamma" => ("\\gamma", "\\Gamma"),
    "delta" => ("\\delta", "\\Delta"),
    "epsilon" => ("\\epsilon", "E"),
    "zeta" => ("\\zeta", "Z"),
    "eta" => ("\\eta", "H"),
    "theta" => ("\\theta", "\\Theta"),
    "iota" => ("\\iota", "I"),
    "kappa" => ("\\kappa", "K"),
    "lambda" => ("\\lambda", "\\Lambda"),
    "mu" => ("\\mu", "M"),
    "nu" => ("\\nu", "N"),
    "xi" => ("\\xi", "\\Xi"),
    "omicron" => ("o", "O"),
    "pi" => ("\\pi", "\\Pi"),
    "rho" => ("\\rho", "P"),
    "sigma" => ("\\sigma", "\\Sigma"),
    "tau" => ("\\tau", "T"),
    "upsilon" => ("\\upsilon", "\\Upsilon"),
    "phi" => ("\\phi", "\\Phi"),
    "chi" => ("\\chi", "X"),
    "psi" => ("\\psi", "\\Psi"),
    "omega" => ("\\omega", "\\Omega"),
};

/// Accents taking one operand.
static ACCENTS: phf::Map<&'static str, &'static str> = phf_map! {
    "hat" => "\\hat",
    "check" => "\\check",
    "tilde" => "\\tilde",
    "acute" => "\\acute",
    "grave" => "\\grave",
    "dot" => "\\dot",
    "ddot" => "\\ddot",
    "bar" => "\\overline",
    "vec" => "\\vec",
    "dyad" => "\\overleftrightarrow",
    "under" => "\\underline",
};

/// Matrix-like layouts: keyword to LaTeX environment.
static LAYOUTS: phf::Map<&'static str, &'static str> = phf_map! {
    "matrix" => "matrix",
    "pmatrix" => "pmatrix",
    "bmatrix" => "bmatrix",
    "dmatrix" => "vmatrix",
    "cases" => "cases",
    "eqalign" => "aligned",
};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(String),
    Quoted(String),
    Open,
    Close,
    Sup,
    Sub,
    RowSep,
    ColSep,
    Space(&'static str),
    Char(char),
}

/// Convert an equation script to LaTeX (without math delimiters).
pub fn to_latex(script: &str) -> String {
    let tokens = tokenize(script);
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let mut out = String::new();
    // Stray closing braces end `sequence` early; skip them and carry on.
    loop {
        append(&mut out, &parser.sequence(|_| false));
        if parser.bump().is_none() {
            break;
        }
    }
    out
}

fn tokenize(script: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = script.chars().peekable();
    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '{' => Token::Open,
            '}' => Token::Close,
            '^' => Token::Sup,
            '_' => Token::Sub,
            '#' => Token::RowSep,
            '&' => Token::ColSep,
            '~' => Token::Space("\\ "),
            '`' => Token::Space("\\,"),
            '"' => {
                let mut text = String::new();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    text.push(c);
                }
                Token::Quoted(text)
            },
            c if c.is_ascii_alphabetic() => {
                let mut word = c.to_string();
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                Token::Word(word)
            },
            c if c.is_ascii_digit() => {
                let mut number = c.to_string();
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    number.push(next);
                    chars.next();
                }
                Token::Number(number)
            },
            c => Token::Char(c),
        };
        tokens.push(token);
    }
    tokens
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_word(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    /// Operands up to a closing brace, the end, or a token `stop` accepts.
    fn sequence(&mut self, stop: impl Fn(&Token) -> bool) -> String {
        let mut operands: Vec<String> = Vec::new();
        while let Some(token) = self.peek() {
            if *token == Token::Close || stop(token) {
                break;
            }
            if self.peek_word("over") {
                self.pos += 1;
                let numerator = operands.pop().unwrap_or_default();
                let denominator = self.operand();
                operands.push(format!(
                    "\\frac{{{}}}{{{}}}",
                    unbrace(&numerator),
                    unbrace(&denominator)
                ));
                continue;
            }
            if let Some(mark) = self.script_mark() {
                let base = operands.pop().unwrap_or_else(|| "{}".to_string());
                operands.push(format!("{}{}{{{}}}", base, mark, unbrace(&self.operand())));
                continue;
            }
            operands.push(self.operand());
        }

        let mut out = String::new();
        for operand in &operands {
            append(&mut out, operand);
        }
        out
    }

    /// Consume a `^`/`_`/`sup`/`sub` marker.
    fn script_mark(&mut self) -> Option<char> {
        let mark = match self.peek()? {
            Token::Sup => '^',
            Token::Sub => '_',
            Token::Word(w) if w.eq_ignore_ascii_case("sup") => '^',
            Token::Word(w) if w.eq_ignore_ascii_case("sub") => '_',
            _ => return None,
        };
        self.pos += 1;
        Some(mark)
    }

    /// One atom followed by any scripts attached to it.
    fn operand(&mut self) -> String {
        let mut base = self.atom();
        while let Some(mark) = self.script_mark() {
            let script = self.atom();
            base = format!("{}{}{{{}}}", base, mark, unbrace(&script));
        }
        base
    }

    fn atom(&mut self) -> String {
        let Some(token) = self.bump() else {
            return String::new();
        };
        match token {
            Token::Open => {
                let inner = self.sequence(|_| false);
                if self.peek() == Some(&Token::Close) {
                    self.pos += 1;
                }
                format!("{{{}}}", inner)
            },
            Token::Word(word) => self.word(word),
            Token::Number(number) => number.clone(),
            Token::Quoted(text) => format!("\\text{{{}}}", text),
            Token::Space(space) => (*space).to_string(),
            Token::Char(c) => escape_char(*c),
            Token::Sup => "^{}".to_string(),
            Token::Sub => "_{}".to_string(),
            Token::Close | Token::RowSep | Token::ColSep => String::new(),
        }
    }

    fn word(&mut self, word: &str) -> String {
        let key = word.to_ascii_lowercase();
        match key.as_str() {
            "sqrt" => format!("\\sqrt{{{}}}", unbrace(&self.operand())),
            "root" => {
                let degree = self.operand();
                if self.peek_word("of") {
                    self.pos += 1;
                }
                format!("\\sqrt[{}]{{{}}}", unbrace(&degree), unbrace(&self.operand()))
            },
            "left" | "right" => {
                let delimiter = match self.bump() {
                    Some(Token::Open) => "\\{".to_string(),
                    Some(Token::Close) => "\\}".to_string(),
                    Some(Token::Char(c)) => c.to_string(),
                    Some(Token::Word(w)) => self.word(w),
                    _ => ".".to_string(),
                };
                format!("\\{}{}", key, delimiter)
            },
            "rm" | "it" | "bold" => self.operand(),
            _ => {
                if let Some(command) = ACCENTS.get(key.as_str()) {
                    return format!("{}{{{}}}", command, unbrace(&self.operand()));
                }
                if let Some(environment) = LAYOUTS.get(key.as_str()) {
                    return self.layout(environment);
                }
                if let Some(symbol) = SYMBOLS.get(key.as_str()) {
                    return (*symbol).to_string();
                }
                if let Some((lower, upper)) = GREEK.get(key.as_str()) {
                    let capital = word.starts_with(|c: char| c.is_ascii_uppercase());
                    return (if capital { *upper } else { *lower }).to_string();
                }
                word.to_string()
            },
        }
    }

    /// `{ a & b # c & d }` as a LaTeX environment.
    fn layout(&mut self, environment: &str) -> String {
        let mut body = String::new();
        if self.peek() == Some(&Token::Open) {
            self.pos += 1;
            loop {
                body.push_str(&self.sequence(|t| matches!(t, Token::RowSep | Token::ColSep)));
                match self.bump() {
                    Some(Token::ColSep) => body.push('&'),
                    Some(Token::RowSep) => body.push_str("\\\\"),
                    _ => break,
                }
            }
        }
        format!("\\begin{{{0}}}{1}\\end{{{0}}}", environment, body)
    }
}

/// Append `piece`, separating a command name from a following letter.
fn append(out: &mut String, piece: &str) {
    let ends_with_command = {
        let letters = out.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        letters.len() < out.len() && letters.ends_with('\\')
    };
    if ends_with_command && piece.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.push(' ');
    }
    out.push_str(piece);
}

/// Strip one pair of braces enclosing the whole string.
fn unbrace(s: &str) -> &str {
    let Some(inner) = s.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) else {
        return s;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return s;
                }
            },
            _ => {},
        }
    }
    if depth == 0 { inner } else { s }
}

fn escape_char(c: char) -> String {
    match c {
        '%' | '$' => format!("\\{}", c),
        '\\' => "\\backslash".to_string(),
        _ => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(to_latex("a over b"), "\\frac{a}{b}");
        assert_eq!(to_latex("{a+1} over {b-1}"), "\\frac{a+1}{b-1}");
        assert_eq!(to_latex("x^2 over 2"), "\\frac{x^{2}}{2}");
        assert_eq!(to_latex("1 over {1 over x}"), "\\frac{1}{\\frac{1}{x}}");
    }

    #[test]
    fn test_roots() {
        assert_eq!(to_latex("sqrt {x^2 + y^2}"), "\\sqrt{x^{2}+y^{2}}");
        assert_eq!(to_latex("SQRT x"), "\\sqrt{x}");
        assert_eq!(to_latex("root 3 of x"), "\\sqrt[3]{x}");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(to_latex("x sub 1 sup 2"), "x_{1}^{2}");
        assert_eq!(to_latex("a_{ij}"), "a_{ij}");
        assert_eq!(to_latex("e^{i pi}"), "e^{i\\pi}");
    }

    #[test]
    fn test_big_operators() {
        assert_eq!(to_latex("sum _{i=1} ^n i"), "\\sum_{i=1}^{n}i");
        assert_eq!(to_latex("int _0 ^1 f(x) dx"), "\\int_{0}^{1}f(x)dx");
        assert_eq!(to_latex("lim _{x rarrow 0}"), "\\lim_{x\\rightarrow0}");
    }

    #[test]
    fn test_symbols_and_greek() {
        assert_eq!(to_latex("a times b"), "a\\times b");
        assert_eq!(to_latex("alpha + GAMMA"), "\\alpha+\\Gamma");
        assert_eq!(to_latex("sin theta"), "\\sin\\theta");
        assert_eq!(to_latex("sin x"), "\\sin x");
        assert_eq!(to_latex("x leq y"), "x\\leq y");
    }

    #[test]
    fn test_layouts() {
        assert_eq!(
            to_latex("pmatrix {a & b # c & d}"),
            "\\begin{pmatrix}a&b\\\\c&d\\end{pmatrix}"
        );
        assert_eq!(
            to_latex("cases {1 & x > 0 # 0 & \"otherwise\"}"),
            "\\begin{cases}1&x>0\\\\0&\\text{otherwise}\\end{cases}"
        );
    }

    #[test]
    fn test_accents_and_delimiters() {
        assert_eq!(to_latex("hat x + vec {AB}"), "\\hat{x}+\\vec{AB}");
        assert_eq!(to_latex("left ( a right )"), "\\left(a\\right)");
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(to_latex(""), "");
        assert_eq!(to_latex("a } b"), "ab");
        assert_eq!(to_latex("{a"), "{a}");
        assert_eq!(to_latex("over"), "\\frac{}{}");
    }
}
