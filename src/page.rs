/// Single-page UI served at `/`.
///
/// Selecting a file reads it as a data URL, shows the preview and posts it to
/// `/api/caption` straight away. Regenerate re-posts the stored data URL; Clear
/// only resets local state.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image Caption Generator</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #fafafa;
            color: #18181b;
            min-height: 100vh;
            padding: 48px 16px;
        }

        main { max-width: 640px; margin: 0 auto; }

        header { text-align: center; margin-bottom: 48px; }
        .pill {
            display: inline-block;
            padding: 6px 16px;
            border-radius: 999px;
            border: 1px solid rgba(59, 130, 246, 0.2);
            background: rgba(59, 130, 246, 0.08);
            color: #2563eb;
            font-size: 0.85em;
            font-weight: 500;
            margin-bottom: 16px;
        }
        h1 { font-size: 2.6em; letter-spacing: -0.02em; margin-bottom: 12px; }
        .subtitle { color: #52525b; font-size: 1.1em; }

        .upload-area {
            border: 2px dashed #d4d4d8;
            border-radius: 24px;
            padding: 56px 24px;
            text-align: center;
            cursor: pointer;
            transition: all 0.2s ease;
        }
        .upload-area:hover { border-color: #a1a1aa; }
        .upload-area.dragover { border-color: #3b82f6; background: rgba(59, 130, 246, 0.05); }
        .upload-text { font-size: 1.1em; font-weight: 500; margin-bottom: 4px; }
        .upload-hint { color: #71717a; font-size: 0.9em; }
        #fileInput { display: none; }

        .preview {
            display: none;
            position: relative;
            border-radius: 24px;
            overflow: hidden;
            background: #000;
            aspect-ratio: 16 / 9;
        }
        .preview img { width: 100%; height: 100%; object-fit: contain; }
        .clear {
            position: absolute;
            top: 16px;
            right: 16px;
            border: none;
            border-radius: 999px;
            width: 36px;
            height: 36px;
            background: rgba(0, 0, 0, 0.5);
            color: #fff;
            font-size: 1.1em;
            cursor: pointer;
        }

        .result {
            display: none;
            margin-top: 32px;
            background: #fff;
            border: 1px solid #e4e4e7;
            border-radius: 16px;
            padding: 24px;
        }
        .loading { text-align: center; color: #71717a; padding: 24px 0; }
        .spinner {
            border: 3px solid #e4e4e7;
            border-top: 3px solid #3b82f6;
            border-radius: 50%;
            width: 32px;
            height: 32px;
            animation: spin 1s linear infinite;
            margin: 0 auto 12px;
        }
        @keyframes spin { 0% { transform: rotate(0deg); } 100% { transform: rotate(360deg); } }

        .caption { font-size: 1.1em; line-height: 1.6; white-space: pre-wrap; }
        .caption.error { color: #dc2626; }
        .actions {
            display: flex;
            justify-content: flex-end;
            gap: 8px;
            margin-top: 16px;
            padding-top: 16px;
            border-top: 1px solid #f4f4f5;
        }
        .actions button {
            border: none;
            border-radius: 8px;
            padding: 8px 16px;
            font-size: 0.9em;
            font-weight: 500;
            cursor: pointer;
        }
        #regenerateBtn { background: transparent; color: #52525b; }
        #regenerateBtn:hover { background: #f4f4f5; }
        #copyBtn { background: #2563eb; color: #fff; }
        #copyBtn.copied { background: rgba(34, 197, 94, 0.1); color: #16a34a; }
    </style>
</head>
<body>
    <main>
        <header>
            <div class="pill">AI Powered</div>
            <h1>Image Caption Generator</h1>
            <p class="subtitle">Upload an image and let AI craft the perfect caption for your social media.</p>
        </header>

        <div class="upload-area" id="uploadArea">
            <div class="upload-text" id="uploadText">Click or drag to upload</div>
            <div class="upload-hint">Supports PNG, JPG, WEBP</div>
            <input type="file" id="fileInput" accept="image/png,image/jpeg,image/webp">
        </div>

        <div class="preview" id="preview">
            <img id="previewImage" alt="Preview">
            <button class="clear" id="clearBtn" title="Clear">&#x2715;</button>
        </div>

        <div class="result" id="result">
            <div class="loading" id="loading">
                <div class="spinner"></div>
                <p>Analyzing image...</p>
            </div>
            <div id="output">
                <p class="caption" id="captionText"></p>
                <div class="actions">
                    <button id="regenerateBtn">Regenerate</button>
                    <button id="copyBtn">Copy Caption</button>
                </div>
            </div>
        </div>
    </main>

    <script>
        const uploadArea = document.getElementById('uploadArea');
        const uploadText = document.getElementById('uploadText');
        const fileInput = document.getElementById('fileInput');
        const preview = document.getElementById('preview');
        const previewImage = document.getElementById('previewImage');
        const clearBtn = document.getElementById('clearBtn');
        const result = document.getElementById('result');
        const loading = document.getElementById('loading');
        const output = document.getElementById('output');
        const captionText = document.getElementById('captionText');
        const regenerateBtn = document.getElementById('regenerateBtn');
        const copyBtn = document.getElementById('copyBtn');

        let selectedImage = null;

        uploadArea.addEventListener('click', () => fileInput.click());

        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
            uploadText.textContent = 'Drop it here!';
        });

        uploadArea.addEventListener('dragleave', () => {
            uploadArea.classList.remove('dragover');
            uploadText.textContent = 'Click or drag to upload';
        });

        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            uploadText.textContent = 'Click or drag to upload';
            const file = e.dataTransfer.files[0];
            if (file && file.type.startsWith('image/')) {
                handleFile(file);
            }
        });

        fileInput.addEventListener('change', (e) => {
            const file = e.target.files[0];
            if (file) {
                handleFile(file);
            }
            fileInput.value = '';
        });

        clearBtn.addEventListener('click', (e) => {
            e.stopPropagation();
            selectedImage = null;
            previewImage.removeAttribute('src');
            preview.style.display = 'none';
            uploadArea.style.display = 'block';
            showCaption('');
        });

        regenerateBtn.addEventListener('click', () => {
            if (selectedImage) {
                generateCaption(selectedImage);
            }
        });

        copyBtn.addEventListener('click', async () => {
            await navigator.clipboard.writeText(captionText.textContent);
            copyBtn.classList.add('copied');
            copyBtn.textContent = 'Copied!';
            setTimeout(() => {
                copyBtn.classList.remove('copied');
                copyBtn.textContent = 'Copy Caption';
            }, 2000);
        });

        function handleFile(file) {
            const reader = new FileReader();
            reader.onload = (e) => {
                selectedImage = e.target.result;
                previewImage.src = selectedImage;
                uploadArea.style.display = 'none';
                preview.style.display = 'block';
                generateCaption(selectedImage);
            };
            reader.readAsDataURL(file);
        }

        function showLoading() {
            result.style.display = 'block';
            loading.style.display = 'block';
            output.style.display = 'none';
        }

        function showCaption(text, isError = false) {
            loading.style.display = 'none';
            captionText.textContent = text;
            captionText.classList.toggle('error', isError);
            output.style.display = text ? 'block' : 'none';
            result.style.display = text ? 'block' : 'none';
        }

        async function generateCaption(image) {
            showLoading();

            try {
                const response = await fetch('/api/caption', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ image }),
                });

                const data = await response.json().catch(() => ({}));

                if (response.ok) {
                    if (data.caption) {
                        showCaption(data.caption);
                    } else {
                        showCaption('Error: Failed to generate caption. No caption returned from API.', true);
                    }
                } else if (data.error) {
                    showCaption('Error: ' + data.error, true);
                } else {
                    showCaption('Error: Failed to generate caption. Please try again.', true);
                }
            } catch (error) {
                console.error('Network error:', error);
                showCaption('Network error. Please check your connection and try again.', true);
            }
        }
    </script>
</body>
</html>
"#;
