// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Selection of the installable jar from a release's asset list.

use crate::model::ReleaseAsset;

/// Name fragments that mark development or source artifacts.
const EXCLUDED_MARKERS: [&str; 2] = ["-dev", "-sources",];

/// Returns the first asset that is neither a `-dev` nor a `-sources` build
/// and carries a download URL.
///
/// There is no fallback: when no asset qualifies, `None` is returned.
pub fn select_asset(assets: &[ReleaseAsset],) -> Option<&ReleaseAsset,>
{
    assets.iter().find(|asset| {
        !EXCLUDED_MARKERS.iter().any(|marker| asset.name.contains(marker,),)
            && asset.browser_download_url.as_deref().is_some_and(|url| !url.is_empty(),)
    },)
}
