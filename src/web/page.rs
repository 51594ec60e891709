//! Single-page form served at `/`

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>tubegrab</title>
<style>
  body { font-family: system-ui, sans-serif; background: #fff7f7; color: #1e293b; margin: 0; }
  main { max-width: 720px; margin: 48px auto; background: #fff; border: 1px solid #e2e8f0;
         border-radius: 20px; padding: 28px; box-shadow: 0 6px 20px rgba(225, 29, 72, .1); }
  h1 { margin-top: 0; }
  input[type=url] { width: 100%; box-sizing: border-box; padding: 12px; border-radius: 12px;
                    border: 2px solid #e2e8f0; font-size: 15px; }
  button { background: linear-gradient(90deg, #e11d48, #f97316); color: #fff; border: 0;
           border-radius: 12px; padding: 10px 22px; font-size: 15px; cursor: pointer; }
  button:disabled { background: #e2e8f0; color: #94a3b8; cursor: default; }
  .row { display: flex; gap: 12px; align-items: center; margin-top: 14px; flex-wrap: wrap; }
  .meta { color: #475569; font-size: 14px; }
  .error { color: #ef4444; margin-top: 12px; }
  img { max-width: 240px; border-radius: 12px; }
  #details { display: none; margin-top: 20px; }
</style>
</head>
<body>
<main>
  <h1>YouTube Downloader</h1>
  <form id="fetch">
    <input type="url" id="url" placeholder="Paste a YouTube URL here..." required>
    <div class="row"><button type="submit" id="fetch-btn">Fetch</button></div>
  </form>
  <div class="error" id="error"></div>
  <section id="details">
    <div class="row">
      <img id="thumb" alt="">
      <div>
        <h2 id="title"></h2>
        <div class="meta" id="meta"></div>
      </div>
    </div>
    <div class="row">
      <label>Quality <select id="quality"></select></label>
      <label><input type="checkbox" id="video-only"> Video only (no merge)</label>
      <button id="download-btn">Download</button>
    </div>
  </section>
</main>
<script>
const $ = (id) => document.getElementById(id);

function showError(message) { $("error").textContent = message || ""; }

$("fetch").addEventListener("submit", async (event) => {
  event.preventDefault();
  showError("");
  $("details").style.display = "none";
  $("fetch-btn").disabled = true;
  $("fetch-btn").textContent = "Fetching...";
  try {
    const response = await fetch("/api/streams?url=" + encodeURIComponent($("url").value));
    const body = await response.json();
    if (!response.ok) { showError(body.error); return; }
    $("title").textContent = body.title;
    const facts = [body.uploader, body.duration,
                   body.view_count != null ? body.view_count.toLocaleString() + " views" : null];
    $("meta").textContent = facts.filter(Boolean).join("  ·  ");
    $("thumb").src = body.thumbnail || "";
    const quality = $("quality");
    quality.innerHTML = "";
    const options = ["Best Available", "Highest", ...body.resolutions];
    if (body.streams.some((s) => s.has_audio && !s.has_video)) options.push("Audio Only");
    for (const label of options) quality.add(new Option(label, label, false, label === "1080p"));
    $("details").style.display = "block";
  } catch (err) {
    showError("Request failed: " + err);
  } finally {
    $("fetch-btn").disabled = false;
    $("fetch-btn").textContent = "Fetch";
  }
});

$("download-btn").addEventListener("click", () => {
  const params = new URLSearchParams({
    url: $("url").value,
    quality: $("quality").value,
    video_only: $("video-only").checked ? "true" : "false",
  });
  window.location.href = "/api/download?" + params.toString();
});
</script>
</body>
</html>
"#;
