//! Embedded upload page served at `/`. Static document, no templating:
//! it uploads via `POST /` and renders the file list from `GET /list`.

pub const UPLOAD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>File Drop</title>
  <style>
    :root {
      --bg-color: #121212;
      --container-bg: #1e1e1e;
      --text-color: #e0e0e0;
      --border-color: #333333;
      --hover-color: #2c2c2c;
      --button-bg: #6200ea;
      --button-hover: #3700b3;
    }
    body {
      background-color: var(--bg-color);
      color: var(--text-color);
      font-family: Arial, sans-serif;
      margin: 0;
    }
    .container {
      max-width: 800px;
      margin: 40px auto;
      background-color: var(--container-bg);
      padding: 20px;
      border-radius: 8px;
    }
    h1, h2 { text-align: center; }
    .instructions {
      margin-bottom: 30px;
      padding: 15px;
      background-color: var(--hover-color);
      border: 1px solid var(--border-color);
      border-radius: 8px;
      font-size: 14px;
    }
    .instructions pre {
      background: var(--container-bg);
      padding: 10px;
      border-radius: 4px;
      overflow-x: auto;
    }
    #drop-zone {
      padding: 40px;
      border: 2px dashed var(--border-color);
      border-radius: 8px;
      background-color: var(--hover-color);
      cursor: pointer;
      text-align: center;
    }
    #drop-zone.dragover { background-color: var(--border-color); }
    .upload-button {
      background-color: var(--button-bg);
      color: #ffffff;
      padding: 10px 20px;
      border: none;
      border-radius: 4px;
      cursor: pointer;
      margin-top: 20px;
      font-size: 16px;
      width: 100%;
    }
    .upload-button:hover { background-color: var(--button-hover); }
    #selected-files { margin-top: 10px; font-size: 14px; }
    .file-item {
      display: flex;
      justify-content: space-between;
      padding: 10px;
      border-bottom: 1px solid var(--border-color);
    }
    .file-item a { color: var(--button-bg); text-decoration: none; }
    .file-item a:hover { text-decoration: underline; }
    .message { margin-top: 10px; font-size: 14px; text-align: center; }
    .error { color: #ff6b6b; }
    .success { color: #4caf50; }
  </style>
</head>
<body>
  <div class="container">
    <h1>File Drop</h1>
    <div class="instructions">
      <p><strong>Upload via curl:</strong></p>
      <pre>curl -X POST -F "file=@/path/to/file.txt" https://&lt;your-url&gt;/</pre>
      <p><strong>Download via curl:</strong></p>
      <pre>curl https://&lt;your-url&gt;/file.txt -O</pre>
    </div>
    <form id="upload-form" enctype="multipart/form-data" method="post">
      <div id="drop-zone">
        <p>Drag &amp; drop files here or click to select</p>
        <input type="file" name="file" multiple style="display: none;" id="file-input">
      </div>
      <div id="selected-files"></div>
      <div id="status-message" class="message"></div>
      <button type="submit" class="upload-button">Upload Files</button>
    </form>
    <h2>Available Files</h2>
    <div id="files"></div>
  </div>
  <script>
    const dropZone = document.getElementById('drop-zone');
    const fileInput = document.getElementById('file-input');
    const selectedFilesDiv = document.getElementById('selected-files');
    const uploadForm = document.getElementById('upload-form');
    const statusMessage = document.getElementById('status-message');

    dropZone.onclick = () => fileInput.click();

    function formatFileSize(bytes) {
      const units = ['B', 'KB', 'MB', 'GB', 'TB'];
      let size = bytes, unitIndex = 0;
      while (size >= 1024 && unitIndex < units.length - 1) {
        size /= 1024;
        unitIndex++;
      }
      return `${size.toFixed(1)} ${units[unitIndex]}`;
    }

    function updateSelectedFiles() {
      const files = fileInput.files;
      selectedFilesDiv.innerHTML = files.length
        ? '<ul>' + Array.from(files).map(f => `<li>${f.name} (${formatFileSize(f.size)})</li>`).join('') + '</ul>'
        : '';
    }

    fileInput.addEventListener('change', updateSelectedFiles);
    dropZone.ondragover = (e) => { e.preventDefault(); dropZone.classList.add('dragover'); };
    dropZone.ondragleave = () => dropZone.classList.remove('dragover');
    dropZone.ondrop = (e) => {
      e.preventDefault();
      dropZone.classList.remove('dragover');
      fileInput.files = e.dataTransfer.files;
      updateSelectedFiles();
    };

    uploadForm.onsubmit = async (e) => {
      e.preventDefault();
      statusMessage.textContent = '';
      try {
        const response = await fetch('/', { method: 'POST', body: new FormData(uploadForm) });
        if (response.ok) {
          statusMessage.className = 'message success';
          statusMessage.textContent = 'Files uploaded successfully!';
          uploadForm.reset();
          updateSelectedFiles();
          loadFiles();
        } else {
          statusMessage.className = 'message error';
          statusMessage.textContent = 'Upload failed!';
        }
      } catch (error) {
        statusMessage.className = 'message error';
        statusMessage.textContent = 'Upload failed!';
      }
    };

    async function loadFiles() {
      try {
        const response = await fetch('/list');
        const files = await response.json();
        const filesDiv = document.getElementById('files');
        filesDiv.innerHTML = '';
        files.forEach(file => {
          const fileDiv = document.createElement('div');
          fileDiv.className = 'file-item';
          const fileLink = document.createElement('a');
          fileLink.href = '/' + encodeURIComponent(file.name);
          fileLink.textContent = `${file.name} (${formatFileSize(file.size)})`;
          fileDiv.appendChild(fileLink);
          const downloadLink = document.createElement('a');
          downloadLink.href = '/' + encodeURIComponent(file.name);
          downloadLink.setAttribute('download', '');
          downloadLink.textContent = 'Download';
          fileDiv.appendChild(downloadLink);
          filesDiv.appendChild(fileDiv);
        });
      } catch (error) {
        console.error('Error loading files:', error);
      }
    }
    loadFiles();
  </script>
</body>
</html>
"#;
