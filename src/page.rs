use crate::interface::Interface;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 720px; margin: 2em auto; color: #222; }
.panel { display: flex; gap: 2em; }
.panel > div { flex: 1; }
#preview { width: 100%; aspect-ratio: 1; object-fit: cover; background: #eee; }
.bar { background: #e8eefc; margin: 4px 0; position: relative; height: 1.6em; }
.bar span { position: absolute; left: 6px; line-height: 1.6em; }
.bar div { background: #7da2f5; height: 100%; }
#top { font-size: 1.6em; font-weight: bold; }
.error { color: #b00020; }
"#;

const SCRIPT: &str = r#"
function show(result) {
  const top = document.getElementById('top');
  const bars = document.getElementById('bars');
  bars.innerHTML = '';
  if (result.error) {
    top.textContent = result.error;
    top.className = 'error';
    return;
  }
  top.className = '';
  top.textContent = result.label || '';
  for (const c of result.confidences) {
    const bar = document.createElement('div');
    bar.className = 'bar';
    const fill = document.createElement('div');
    fill.style.width = (c.confidence * 100).toFixed(1) + '%';
    const text = document.createElement('span');
    text.textContent = c.label + ' ' + (c.confidence * 100).toFixed(1) + '%';
    bar.appendChild(fill);
    bar.appendChild(text);
    bars.appendChild(bar);
  }
}

async function submitUpload(event) {
  event.preventDefault();
  const file = document.getElementById('image').files[0];
  if (!file) return;
  document.getElementById('preview').src = URL.createObjectURL(file);
  const form = new FormData();
  form.append('image', file);
  const response = await fetch('predict', { method: 'POST', body: form });
  show(await response.json());
}

async function runExample(index) {
  document.getElementById('preview').src = 'examples/' + index;
  const response = await fetch('examples/' + index + '/predict', { method: 'POST' });
  show(await response.json());
}
"#;

pub fn render(interface: &Interface) -> String {
    let shape = interface.input().shape;
    let examples: String = interface
        .example_names()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            format!(
                "<button type=\"button\" onclick=\"runExample({index})\">{}</button>\n",
                escape(name)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>{title}</h1>
<div class="panel">
<div>
<form onsubmit="submitUpload(event)">
<img id="preview" alt="">
<p>Images are resized to {width}x{height}.</p>
<input id="image" type="file" accept="image/*">
<button type="submit">Submit</button>
</form>
<h3>Examples</h3>
{examples}</div>
<div>
<div id="top"></div>
<div id="bars"></div>
</div>
</div>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        title = escape(interface.title()),
        width = shape.width,
        height = shape.height,
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<Dog & \"Cat\">"), "&lt;Dog &amp; &quot;Cat&quot;&gt;");
    }
}
