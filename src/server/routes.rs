use tracing::warn;

use crate::data::store::ShopStore;
use crate::server::api::{self, ShopApiError};

const SHOPS_PREFIX: &str = "/api/shops";

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(status_code: u16, status_text: &'static str, body: String) -> Self {
        Self {
            status_code,
            status_text,
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(store: &mut ShopStore, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload(store) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", SHOPS_PREFIX) => match api::shops_payload(store, path) {
            Ok(payload) => HttpResponse::json(200, "OK", payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", SHOPS_PREFIX) => match api::create_payload(store, body) {
            Ok(payload) => HttpResponse::json(201, "Created", payload),
            Err(err) => shop_error_response(err),
        },
        (method, route) if route.starts_with("/api/shops/") => {
            let Some(index) = parse_index(route) else {
                return error_response(404, "Not Found", "Shop not found");
            };
            let result = match method {
                "GET" => api::shop_payload(store, index),
                "PUT" => api::update_payload(store, index, body),
                "DELETE" => api::delete_payload(store, index),
                _ => return error_response(405, "Method Not Allowed", "Method not allowed"),
            };
            match result {
                Ok(payload) => HttpResponse::json(200, "OK", payload),
                Err(err) => shop_error_response(err),
            }
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn parse_index(route: &str) -> Option<usize> {
    route
        .strip_prefix("/api/shops/")?
        .trim_end_matches('/')
        .parse()
        .ok()
}

fn shop_error_response(err: ShopApiError) -> HttpResponse {
    match err {
        ShopApiError::Parse(err) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        ShopApiError::Validation(validation) => {
            let payload = serde_json::json!({
                "status": "error",
                "kind": validation.kind(),
                "message": validation.to_string(),
            });
            HttpResponse::json(
                422,
                "Unprocessable Entity",
                serde_json::to_string_pretty(&payload)
                    .unwrap_or_else(|_| "{\"status\":\"error\"}".to_string()),
            )
        }
        ShopApiError::NotFound(index) => {
            error_response(404, "Not Found", &format!("No shop at index {index}"))
        }
        ShopApiError::Save(save) => {
            warn!(error = %save, "request could not be persisted");
            error_response(
                500,
                "Internal Server Error",
                &format!("{save}. {}", save.hint()),
            )
        }
        ShopApiError::Serialize(err) => {
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse::json(
        status_code,
        status_text,
        format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    )
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Food Map</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; display: flex; height: 100vh; }
    main { flex: 4; padding: 12px; overflow: auto; }
    aside { flex: 1; min-width: 260px; padding: 12px; background: #f8f9fa; border-left: 1px solid #ddd; }
    .toolbar { display: flex; gap: 6px; align-items: center; margin-bottom: 8px; }
    .toolbar .grow { flex: 1; }
    table { width: 100%; border-collapse: collapse; }
    th { background: #3a3f45; color: #fff; text-align: left; padding: 6px; }
    td { padding: 6px; border-bottom: 1px solid #eee; }
    tr.selected td { background: #cce5ff; }
    tr:hover td { cursor: pointer; }
    dl dt { font-weight: 600; margin-top: 8px; }
    dl dd { margin: 2px 0 0; white-space: pre-wrap; }
    form label { display: block; margin-top: 6px; font-weight: 600; }
    form input { width: 100%; box-sizing: border-box; padding: 4px; }
    #form-card { display: none; margin-top: 12px; }
    #message { color: #b00020; min-height: 1.2em; }
    #status { position: fixed; bottom: 0; left: 0; right: 0; background: #eee; padding: 2px 8px; font-size: 0.85rem; }
  </style>
</head>
<body>
  <main>
    <div class="toolbar">
      <button id="add-btn">+ Add</button>
      <button id="edit-btn">Edit</button>
      <button id="delete-btn">Delete</button>
      <span class="grow"></span>
      <label for="search">Search:</label>
      <input id="search" />
    </div>
    <table>
      <thead><tr><th>Name</th><th>Cuisine</th><th>Dishes</th><th>Updated</th></tr></thead>
      <tbody id="rows"></tbody>
    </table>
  </main>
  <aside>
    <h3>Details</h3>
    <dl id="details"></dl>
    <div id="form-card">
      <h3 id="form-title"></h3>
      <form id="shop-form">
        <label>Name<input name="name" /></label>
        <label>Address<input name="address" /></label>
        <label>Dishes<input name="dishes" /></label>
        <label>Cuisine<input name="cuisine" /></label>
        <label>Recommendation<input name="recommendation" /></label>
        <label>Latitude<input name="latitude" /></label>
        <label>Longitude<input name="longitude" /></label>
        <p id="message"></p>
        <button type="submit">Save</button>
        <button type="button" id="cancel-btn">Cancel</button>
      </form>
    </div>
  </aside>
  <div id="status">Ready</div>

  <script>
    const rowsEl = document.getElementById('rows');
    const detailsEl = document.getElementById('details');
    const searchEl = document.getElementById('search');
    const formCard = document.getElementById('form-card');
    const form = document.getElementById('shop-form');
    const messageEl = document.getElementById('message');
    const statusEl = document.getElementById('status');
    let selected = null;
    let editing = null;

    function cell(text) { const td = document.createElement('td'); td.textContent = text; return td; }

    async function refresh() {
      const response = await fetch('/api/shops?q=' + encodeURIComponent(searchEl.value));
      const data = await response.json();
      rowsEl.innerHTML = '';
      if (!data.rows.some(r => r.index === selected)) { selected = null; detailsEl.innerHTML = ''; }
      for (const row of data.rows) {
        const tr = document.createElement('tr');
        if (row.index === selected) tr.className = 'selected';
        [row.name, row.cuisine, row.dishes, row.updated].forEach(v => tr.appendChild(cell(v)));
        tr.addEventListener('click', () => select(row.index));
        rowsEl.appendChild(tr);
      }
    }

    async function select(index) {
      selected = index;
      const response = await fetch('/api/shops/' + index);
      if (!response.ok) { await refresh(); return; }
      const { shop } = await response.json();
      const fields = [
        ['Name', shop.name], ['Cuisine', shop.cuisine], ['Address', shop.address],
        ['Dishes', shop.dishes.split(',').map(d => d.trim()).filter(Boolean).join('\n')],
        ['Recommendation', shop.recommendation],
        ['Coordinates', shop.latitude.toFixed(4) + ', ' + shop.longitude.toFixed(4)],
        ['Updated', shop.updated],
      ];
      detailsEl.innerHTML = '';
      for (const [label, value] of fields) {
        const dt = document.createElement('dt'); dt.textContent = label;
        const dd = document.createElement('dd'); dd.textContent = value;
        detailsEl.append(dt, dd);
      }
      statusEl.textContent = 'Selected: ' + shop.name;
      await refresh();
    }

    function openForm(title, shop) {
      editing = shop ? selected : null;
      document.getElementById('form-title').textContent = title;
      for (const input of form.elements) {
        if (input.name) input.value = shop ? String(shop[input.name]) : '';
      }
      messageEl.textContent = '';
      formCard.style.display = 'block';
    }

    document.getElementById('add-btn').addEventListener('click', () => openForm('Add shop', null));
    document.getElementById('edit-btn').addEventListener('click', async () => {
      if (selected === null) { alert('Select a shop to edit first'); return; }
      const { shop } = await (await fetch('/api/shops/' + selected)).json();
      openForm('Edit shop', shop);
    });
    document.getElementById('delete-btn').addEventListener('click', async () => {
      if (selected === null) { alert('Select a shop to delete first'); return; }
      if (!confirm('Permanently delete this shop?')) return;
      const response = await fetch('/api/shops/' + selected, { method: 'DELETE' });
      const data = await response.json();
      if (!response.ok) { alert(data.message); return; }
      selected = null;
      detailsEl.innerHTML = '';
      statusEl.textContent = 'Deleted: ' + data.shop.name;
      await refresh();
    });
    document.getElementById('cancel-btn').addEventListener('click', () => { formCard.style.display = 'none'; });

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const payload = Object.fromEntries(new FormData(form).entries());
      const url = editing === null ? '/api/shops' : '/api/shops/' + editing;
      const response = await fetch(url, {
        method: editing === null ? 'POST' : 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload),
      });
      const data = await response.json();
      if (!response.ok) { messageEl.textContent = data.message; return; }
      formCard.style.display = 'none';
      await select(data.index);
    });

    searchEl.addEventListener('input', refresh);
    refresh();
  </script>
</body>
</html>
"#
    .to_string()
}
