//! HTML pages served to the phone's browser.

use vision_core::Caption;

pub const UPLOAD_FORM: &str = r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>TCC - Descrição de Imagem</title>
</head>
<body>
  <h1>Enviar foto para análise</h1>
  <form method="post" action="/" enctype="multipart/form-data">
    <label for="image">Imagem</label>
    <input type="file" id="image" name="image" accept="image/*">
    <br><br>
    <input type="submit" value="Enviar e Descrever">
  </form>
</body>
</html>
"#;

pub fn success_page(caption: &Caption) -> String {
    format!(
        r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>TCC - Descrição de Imagem</title></head>
<body>
  <h1>Sucesso!</h1>
  <p><b>Descrição:</b> {}</p>
  <a href="/">Enviar outra imagem</a>
</body>
</html>
"#,
        escape_html(caption.as_str())
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
