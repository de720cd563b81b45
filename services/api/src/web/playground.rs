//! services/api/src/web/playground.rs
//!
//! The browser test page served at `GET /chat`. It posts to its own path, so it
//! works under every mount prefix.

pub const PLAYGROUND_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Sungura AI Playground</title>
    <script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js"></script>
    <style>
      body { font-family: 'Segoe UI', sans-serif; padding: 20px; max-width: 800px; margin: auto; background: #f0f2f5; }
      h1 { color: #6B4EFF; text-align: center; }
      #chat { border-radius: 12px; padding: 20px; height: 500px; overflow-y: auto; margin-bottom: 10px; background: white; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
      .user-msg { background: #6B4EFF; color: white; padding: 10px 15px; border-radius: 15px 15px 0 15px; margin: 10px 0 10px auto; max-width: 80%; width: fit-content; }
      .ai-msg { background: #f0f0f0; color: #333; padding: 15px; border-radius: 15px 15px 15px 0; margin: 10px auto 10px 0; max-width: 80%; }
      .input-area { display: flex; gap: 10px; }
      input, select { padding: 12px; border: 1px solid #ddd; border-radius: 25px; outline: none; }
      input { flex: 1; }
      button { padding: 10px 25px; background: #6B4EFF; color: white; border: none; border-radius: 25px; cursor: pointer; font-weight: bold; }
    </style>
  </head>
  <body>
    <h1>🐰 Sungura AI Playground</h1>
    <div id="chat"></div>
    <div class="input-area">
      <select id="style">
        <option>Visual</option>
        <option>Auditory</option>
        <option>Reading/Writing</option>
        <option>Kinesthetic</option>
        <option>Standard</option>
      </select>
      <input type="text" id="msg" placeholder="Ask Sungura..." onkeypress="if(event.key==='Enter') send()">
      <button onclick="send()">Send</button>
    </div>
    <script>
      function appendBubble(cls, text, asHtml) {
        const chat = document.getElementById('chat');
        const div = document.createElement('div');
        div.className = cls;
        if (asHtml) { div.innerHTML = text; } else { div.textContent = text; }
        chat.appendChild(div);
        chat.scrollTop = chat.scrollHeight;
      }

      async function send() {
        const input = document.getElementById('msg');
        const msg = input.value;
        if (!msg) return;
        appendBubble('user-msg', msg, false);
        input.value = '';

        try {
          const res = await fetch(window.location.pathname, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
              message: msg,
              learningStyle: document.getElementById('style').value,
              courseContext: 'General'
            })
          });
          const data = await res.json();
          if (!res.ok) {
            appendBubble('ai-msg', data.error + (data.details ? ': ' + data.details : ''), false);
            return;
          }
          appendBubble('ai-msg', marked.parse(data.response), true);
        } catch (err) {
          appendBubble('ai-msg', 'Error connecting to AI', false);
        }
      }
    </script>
  </body>
</html>
"#;
