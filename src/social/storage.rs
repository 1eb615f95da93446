//! 对象存储 URL 解析
//!
//! 图片字段可能是：完整的存储桶 URL、桶内相对路径（`publicaciones/abc.jpg`）、
//! 或旧版本地上传路径（`/uploads/abc.jpg`）。

/// 存储桶内的目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFolder {
    /// 头像
    Perfiles,
    /// 封面
    Portadas,
    /// 动态配图
    Publicaciones,
}

impl StorageFolder {
    pub const ALL: [StorageFolder; 3] = [
        StorageFolder::Perfiles,
        StorageFolder::Portadas,
        StorageFolder::Publicaciones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageFolder::Perfiles => "perfiles",
            StorageFolder::Portadas => "portadas",
            StorageFolder::Publicaciones => "publicaciones",
        }
    }

    fn prefix_of(path: &str) -> Option<StorageFolder> {
        let path = path.trim_start_matches('/');
        Self::ALL
            .into_iter()
            .find(|folder| path.starts_with(&format!("{}/", folder.as_str())))
    }
}

/// 解析图片地址，空值返回 `None`
pub fn resolve_image_url(raw: Option<&str>, storage_base_url: &str, api_base_url: &str) -> Option<String> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;

    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }

    if StorageFolder::prefix_of(raw).is_some() {
        return Some(join(storage_base_url, raw));
    }

    Some(join(api_base_url, raw))
}

/// 由旧上传路径重建桶内对象键：取文件名放入指定目录
pub fn object_key_for_legacy(legacy_path: &str, folder: StorageFolder) -> Option<String> {
    let file_name = legacy_path
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())?;
    Some(format!("{}/{}", folder.as_str(), file_name))
}

/// 旧上传路径 → 存储桶完整 URL；已是完整 URL 时原样返回
pub fn storage_url_for_legacy(legacy_path: &str, folder: StorageFolder, storage_base_url: &str) -> Option<String> {
    if legacy_path.starts_with("http://") || legacy_path.starts_with("https://") {
        return Some(legacy_path.to_string());
    }
    if StorageFolder::prefix_of(legacy_path).is_some() {
        return Some(join(storage_base_url, legacy_path));
    }
    object_key_for_legacy(legacy_path, folder).map(|key| join(storage_base_url, &key))
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
