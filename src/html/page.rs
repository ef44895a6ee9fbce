pub(super) const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link
    rel="stylesheet"
    href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
    integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
    crossorigin=""
  />
  <style>
    html, body { height: 100%; margin: 0; padding: 0; font-family: sans-serif; }
    #app-header {
      position: absolute; top: 0; left: 0; right: 0; height: 44px; z-index: 1000;
      display: flex; align-items: center; justify-content: space-between;
      padding: 0 12px; background: #fff; box-shadow: 0 1px 4px rgba(0,0,0,0.3);
    }
    #map { position: absolute; top: 44px; bottom: 0; left: 0; right: 0; z-index: 10; }
    #layer-control {
      position: absolute; top: 56px; right: 10px; z-index: 1000;
      background: #fff; border-radius: 5px; box-shadow: 0 1px 5px rgba(0,0,0,0.4);
      padding: 6px 10px; max-height: 80%; overflow-y: auto; font-size: 13px;
    }
    #layer-control.collapsed .layer-panel { display: none; }
    #layer-control .toggle { cursor: pointer; font-weight: bold; }
    .overlay { display: flex; justify-content: space-between; align-items: center; }
    .overlay .opacity { width: 70px; margin-left: 10px; }
    .legend-container { padding-top: 5px; margin-top: 5px; }
    .legend-swatch {
      width: 12px; height: 12px; float: left; margin-left: 20px; margin-right: 5px; opacity: 0.7;
    }
    .separator { height: 0; margin: 6px 0; border-top: 1px solid #ddd; }
    .loading-spinner {
      position: absolute; top: 50%; left: 50%; z-index: 2000;
      width: 40px; height: 40px; margin: -20px 0 0 -20px;
      border: 4px solid #ddd; border-top-color: #555; border-radius: 50%;
      animation: spin 1s linear infinite;
    }
    @keyframes spin { to { transform: rotate(360deg); } }
    dialog#about { z-index: 20000; max-width: 480px; font-size: 0.8em; text-align: left; }
  </style>
</head>
<body>
  <header id="app-header">
    <span>{{TITLE}}</span>
    <button id="data-describe" type="button">資料說明</button>
  </header>

  <div id="map"></div>
  <div id="loading-spinner" class="loading-spinner"></div>

  <div id="layer-control" class="collapsed">
    <div class="toggle">&#9776;</div>
    {{PANEL}}
  </div>

  <dialog id="about">
    <h3 id="about-title"></h3>
    <div id="about-body"></div>
    <button id="about-confirm" type="button"></button>
  </dialog>

  <script type="application/json" id="bootstrap">{{BOOTSTRAP}}</script>
  <script
    src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
    integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
    crossorigin=""
  ></script>
  <script>
    const boot = JSON.parse(document.getElementById('bootstrap').textContent);
    const api = boot.api;
    const layerPath = name => `/layers/${encodeURIComponent(name)}`;

    function put(path, body) {
      return fetch(api + path, {
        method: 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body),
      }).catch(console.error);
    }

    const map = L.map('map').setView(boot.view.center, boot.view.zoom);

    // Panes order markers, polygons and the mask independent of insertion order.
    boot.view.panes.forEach(pane => {
      const el = map.getPane(pane.name) || map.createPane(pane.name);
      el.style.zIndex = pane.zIndex;
    });

    const baseLayers = {};
    boot.baseMaps.forEach(base => {
      baseLayers[base.name] = L.tileLayer(base.url, { attribution: base.attribution });
    });
    if (baseLayers[boot.view.base_layer]) {
      baseLayers[boot.view.base_layer].addTo(map);
    }

    function toLeaflet(data) {
      if (data.type === 'tiles') {
        return L.tileLayer(data.url, { attribution: data.attribution, opacity: data.opacity });
      }
      return L.geoJSON(data, {
        style: feature => feature.style || {},
        pointToLayer: (feature, latlng) => {
          const marker = feature.marker || {};
          const options = { pane: marker.pane || 'markerPane', shadowPane: marker.pane || 'markerPane' };
          if (marker.icon) {
            options.icon = L.icon(marker.icon);
          }
          return L.marker(latlng, options);
        },
        onEachFeature: (feature, layer) => {
          if (feature.popup) {
            layer.bindPopup(feature.popup);
          }
        },
      });
    }

    const overlays = {};

    function wirePanel() {
      document.querySelectorAll('input[name="base-layer"]').forEach(input => {
        input.addEventListener('change', () => {
          Object.values(baseLayers).forEach(layer => map.removeLayer(layer));
          baseLayers[input.value].addTo(map);
          put('/basemaps/active', { name: input.value });
        });
      });

      document.querySelectorAll('input[type="checkbox"][data-layer]').forEach(input => {
        input.addEventListener('change', () => {
          const layer = overlays[input.dataset.layer];
          if (!layer) return;
          if (input.checked) {
            layer.addTo(map);
          } else {
            map.removeLayer(layer);
          }
          put(layerPath(input.dataset.layer) + '/visibility', { visible: input.checked });
        });
      });

      document.querySelectorAll('input.opacity[data-layer]').forEach(input => {
        input.addEventListener('input', () => {
          const layer = overlays[input.dataset.layer];
          if (!layer) return;
          const opacity = parseFloat(input.value);
          if (layer.setOpacity) {
            layer.setOpacity(opacity);
          }
          if (layer.eachLayer) {
            layer.eachLayer(sub => {
              if (sub.setStyle) {
                sub.setStyle({ opacity: opacity, fillOpacity: opacity });
              }
            });
          }
          put(layerPath(input.dataset.layer) + '/opacity', { opacity: opacity });
        });
      });
    }

    Promise.all(boot.overlays.map(name =>
      fetch(api + layerPath(name))
        .then(response => {
          if (!response.ok) {
            throw new Error(`HTTP error! status: ${response.status}`);
          }
          return response.json();
        })
        .then(data => { overlays[name] = toLeaflet(data); })
        .catch(error => console.error(`Error loading layer ${name}:`, error))
    )).then(() => {
      document.getElementById('loading-spinner').style.display = 'none';
      boot.view.attached.forEach(name => {
        if (overlays[name]) {
          overlays[name].addTo(map);
        }
      });
      wirePanel();
      map.invalidateSize();
    });

    const control = document.getElementById('layer-control');
    control.querySelector('.toggle').addEventListener('click', () => {
      control.classList.toggle('collapsed');
    });

    const dialog = document.getElementById('about');
    document.getElementById('about-title').textContent = boot.about.title;
    document.getElementById('about-body').innerHTML = boot.about.bodyHtml;
    document.getElementById('about-confirm').textContent = boot.about.confirmText;

    function relayout(event) {
      fetch(`${api}/about/${event}`, { method: 'POST' }).catch(console.error);
      setTimeout(() => map.invalidateSize(), 50);
    }

    document.getElementById('data-describe').addEventListener('click', () => {
      dialog.showModal();
      relayout('open');
    });
    document.getElementById('about-confirm').addEventListener('click', () => dialog.close());
    dialog.addEventListener('close', () => relayout('close'));
    dialog.addEventListener('cancel', event => {
      if (!boot.about.allowEscapeKey) {
        event.preventDefault();
      }
    });
    dialog.addEventListener('click', event => {
      if (boot.about.allowOutsideClick && event.target === dialog) {
        dialog.close();
      }
    });
  </script>
</body>
</html>
"#;
