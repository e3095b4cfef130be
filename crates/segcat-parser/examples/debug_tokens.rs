use segcat_parser::lexer::{unquote, Lexer};

fn main() {
    let test_cases = vec![
        "ffconcat version 1.0",
        "file 'my holiday clip.ts' # trailing",
        r"file escaped\ name.ts",
        "  duration\t00:01:30.5  ",
    ];

    for input in test_cases {
        println!("\n=== {} ===", input);
        let lexer = Lexer::new(input);
        for (i, (token, span)) in lexer.tokens().iter().enumerate() {
            let text = &input[span.start..span.end];
            println!("  [{}] {:?} => '{}'", i, token, unquote(text));
        }
    }
}
