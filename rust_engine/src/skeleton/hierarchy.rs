//! 广度优先求值顺序

use crate::{FormatError, FormatResult};

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    InProgress,
    Done(usize),
}

/// 计算骨骼的广度优先求值顺序
///
/// 层级 = 父骨骼层级 + 1，根骨骼为第 0 层；同层按原始下标排列。
/// 迭代实现并记忆化，骨骼可以任意顺序出现；父链成环时返回 `CyclicHierarchy`。
pub fn breadth_first_order(parents: &[Option<usize>]) -> FormatResult<Vec<usize>> {
    let count = parents.len();
    let mut visits = vec![Visit::Pending; count];
    let mut chain = Vec::new();

    for start in 0..count {
        if visits[start] != Visit::Pending {
            continue;
        }

        // 沿父链向上，直到根或已知层级的骨骼
        let mut current = start;
        let mut base_layer = loop {
            match visits[current] {
                Visit::Done(layer) => break Some(layer),
                Visit::InProgress => return Err(FormatError::CyclicHierarchy { bone: current }),
                Visit::Pending => {}
            }
            visits[current] = Visit::InProgress;
            chain.push(current);
            match parents[current] {
                None => break None,
                Some(parent) if parent >= count => {
                    return Err(FormatError::IndexOutOfRange {
                        kind: "parent",
                        index: parent,
                        limit: count,
                    })
                }
                Some(parent) => current = parent,
            }
        };

        // 自上而下回填
        while let Some(bone) = chain.pop() {
            let layer = base_layer.map_or(0, |l| l + 1);
            visits[bone] = Visit::Done(layer);
            base_layer = Some(layer);
        }
    }

    let mut layers: Vec<Vec<usize>> = Vec::new();
    for (bone, visit) in visits.iter().enumerate() {
        if let Visit::Done(layer) = *visit {
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(bone);
        }
    }
    Ok(layers.into_iter().flatten().collect())
}
